/// A set of route patterns and the request paths resolved against them.
#[derive(Debug, Copy, Clone)]
pub struct RouteCase {
    name: &'static str,
    group: TestGroup,
    patterns: &'static [&'static str],
    paths: &'static [&'static str],
}

impl RouteCase {
    pub const fn new(name: &'static str, group: TestGroup, patterns: &'static [&'static str], paths: &'static [&'static str]) -> Self {
        Self { name, group, patterns, paths }
    }

    pub const fn small(name: &'static str, patterns: &'static [&'static str], paths: &'static [&'static str]) -> Self {
        Self::new(name, TestGroup::Small, patterns, paths)
    }

    pub const fn large(name: &'static str, patterns: &'static [&'static str], paths: &'static [&'static str]) -> Self {
        Self::new(name, TestGroup::Large, patterns, paths)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    pub fn paths(&self) -> &'static [&'static str] {
        self.paths
    }
}

/// A body size streamed through the pipe.
#[derive(Debug, Copy, Clone)]
pub struct PayloadCase {
    name: &'static str,
    group: TestGroup,
    len: usize,
}

impl PayloadCase {
    pub const fn new(name: &'static str, group: TestGroup, len: usize) -> Self {
        Self { name, group, len }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

/// A REST-like route set, with literal siblings of wildcard segments.
pub static API_PATTERNS: &[&str] = &[
    "/",
    "/users",
    "/users/*",
    "/users/me",
    "/users/*/orders",
    "/users/*/orders/*",
    "/users/*/orders/*/items/*",
    "/products",
    "/products/*",
    "/products/featured",
    "/products/*/reviews",
    "/search",
    "/admin/settings",
    "/admin/users/*",
    "/static/css/site.css",
    "/static/js/app.js",
];

pub static API_PATHS: &[&str] = &[
    "/",
    "/users/me",
    "/users/42",
    "/users/42/orders/7",
    "/users/42/orders/7/items/3",
    "/PRODUCTS/featured",
    "/products/abc/reviews",
    "//static//css/site.css/",
    "/missing/route",
];
