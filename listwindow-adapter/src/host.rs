use core::fmt;

/// Computed vertical overflow of a host element.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
    Overlay,
}

impl Overflow {
    /// Whether content that exceeds the box can be scrolled by the user.
    pub fn can_scroll(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll | Self::Overlay)
    }
}

/// The element whose scroll position moves a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollContainer<N> {
    /// The whole page scrolls.
    Page,
    /// A nested scrollable element.
    Element(N),
}

impl<N> ScrollContainer<N> {
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page)
    }

    pub fn element(&self) -> Option<&N> {
        match self {
            Self::Page => None,
            Self::Element(n) => Some(n),
        }
    }
}

/// A registered size observation, returned by [`Host::observe_size`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(pub u64);

/// A scheduled frame callback, returned by [`Host::request_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Capabilities a rendering surface exposes to the list controllers.
///
/// The controllers never hold host objects beyond `Node` handles and never call back into the
/// host on their own: the host forwards its events (`on_scroll`, `on_resize`, frame and
/// microtask callbacks) and passes itself in.
///
/// Optional capabilities have defaults that report "unsupported"; the controllers then fall
/// back to synchronous computation.
pub trait Host {
    type Node: Copy + Eq + fmt::Debug;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Document-level nodes (e.g. `<html>`/`<body>`) are never treated as nested scroll
    /// containers; page scrolling covers them.
    fn is_document_root(&self, node: Self::Node) -> bool;

    fn overflow_y(&self, node: Self::Node) -> Overflow;

    /// Shorthand overflow applying to both axes.
    fn overflow(&self, _node: Self::Node) -> Overflow {
        Overflow::Visible
    }

    fn scroll_height(&self, node: Self::Node) -> u32;

    fn client_height(&self, node: Self::Node) -> u32;

    /// Top of the node's box relative to the host viewport.
    ///
    /// `None` means the host cannot do layout (e.g. a headless renderer).
    fn rect_top(&self, node: Self::Node) -> Option<i64>;

    /// Rendered height of the node, possibly fractional. `None` when unavailable.
    fn measure(&self, node: Self::Node) -> Option<f64>;

    fn page_scroll_top(&self) -> u64;

    fn page_viewport_height(&self) -> u32;

    fn element_scroll_top(&self, node: Self::Node) -> u64;

    fn set_page_scroll_top(&mut self, top: u64);

    fn set_element_scroll_top(&mut self, node: Self::Node, top: u64);

    /// Starts delivering size changes of `node`. `None` if the host cannot observe sizes.
    fn observe_size(&mut self, _node: Self::Node) -> Option<ObserverHandle> {
        None
    }

    fn unobserve(&mut self, _handle: ObserverHandle) {}

    /// Starts delivering scroll events of `target` (and viewport resizes for the page).
    fn watch_scroll(&mut self, _target: ScrollContainer<Self::Node>) {}

    fn unwatch_scroll(&mut self, _target: ScrollContainer<Self::Node>) {}

    /// Schedules one frame callback. `None` if the host has no frame callbacks.
    fn request_frame(&mut self) -> Option<FrameHandle> {
        None
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}

    /// Schedules one microtask callback. Returns `false` if the host has no microtask queue.
    fn queue_microtask(&mut self) -> bool {
        false
    }

    /// Finds a representative rendered row inside `container`.
    fn query_row(&self, _container: Self::Node, _selector: &str) -> Option<Self::Node> {
        None
    }

    fn scroll_top_of(&self, target: ScrollContainer<Self::Node>) -> u64 {
        match target {
            ScrollContainer::Page => self.page_scroll_top(),
            ScrollContainer::Element(n) => self.element_scroll_top(n),
        }
    }

    fn viewport_height_of(&self, target: ScrollContainer<Self::Node>) -> u32 {
        match target {
            ScrollContainer::Page => self.page_viewport_height(),
            ScrollContainer::Element(n) => self.client_height(n),
        }
    }

    fn scroll_to(&mut self, target: ScrollContainer<Self::Node>, top: u64) {
        match target {
            ScrollContainer::Page => self.set_page_scroll_top(top),
            ScrollContainer::Element(n) => self.set_element_scroll_top(n, top),
        }
    }
}

/// Whether `node` is a nested element that currently scrolls its content vertically.
pub fn is_scrollable<H: Host + ?Sized>(host: &H, node: H::Node) -> bool {
    let can_scroll = host.overflow_y(node).can_scroll() || host.overflow(node).can_scroll();
    can_scroll && host.scroll_height(node) > host.client_height(node)
}

/// Walks the ancestors of `node` and returns the first one that scrolls, or the page.
pub fn find_scroll_parent<H: Host + ?Sized>(host: &H, node: H::Node) -> ScrollContainer<H::Node> {
    let mut current = host.parent(node);
    while let Some(n) = current {
        if !host.is_document_root(n) && is_scrollable(host, n) {
            return ScrollContainer::Element(n);
        }
        current = host.parent(n);
    }
    ScrollContainer::Page
}
