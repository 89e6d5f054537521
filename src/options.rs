/// Knobs that change how source text is tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanOptions {
    /// Treat the input as PHP code from the first byte, without
    /// requiring a leading `<?php` tag.
    pub start_in_code: bool,
    /// Accept the short `<?` open tag (`short_open_tag` ini setting).
    pub short_open_tags: bool,
}

impl ScanOptions {
    /// Defaults: HTML mode until `<?php`, no short tags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start_in_code: false,
            short_open_tags: false,
        }
    }

    /// Start lexing in PHP mode.
    #[must_use]
    pub const fn start_in_code(mut self, yes: bool) -> Self {
        self.start_in_code = yes;
        self
    }

    /// Accept `<?` as an open tag.
    #[must_use]
    pub const fn short_open_tags(mut self, yes: bool) -> Self {
        self.short_open_tags = yes;
        self
    }
}
