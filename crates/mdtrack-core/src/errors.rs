/// Result type alias using TrackError
pub type Result<T> = std::result::Result<T, TrackError>;

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in mdtrack. Each kind maps to a stable error code that can be used for
/// programmatic error handling and testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackErrorKind {
    // Source
    /// The relational source is missing, unreadable, or a scan query failed
    SourceAccess,

    // Persisted state
    /// An existing snapshot, ledger, pointer, or diff file is unreadable or malformed
    CorruptState,
    /// Writing an artifact failed (disk full, permission denied)
    WriteFailure,
    /// Appending to the ledger would break hash uniqueness or the chain property
    ChainViolation,

    // Diffing
    /// Two rows in one table produced the same diff key
    DuplicateKey,

    // Generic
    InvalidInput,
    NotFound,
    Serialization,
    Io,
    /// Asset fetcher input errors (malformed URL or key list, not per-key misses)
    Http,
    Internal,
}

impl TrackErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            TrackErrorKind::SourceAccess => "ERR_SOURCE_ACCESS",
            TrackErrorKind::CorruptState => "ERR_CORRUPT_STATE",
            TrackErrorKind::WriteFailure => "ERR_WRITE_FAILURE",
            TrackErrorKind::ChainViolation => "ERR_CHAIN_VIOLATION",
            TrackErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            TrackErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            TrackErrorKind::NotFound => "ERR_NOT_FOUND",
            TrackErrorKind::Serialization => "ERR_SERIALIZATION",
            TrackErrorKind::Io => "ERR_IO",
            TrackErrorKind::Http => "ERR_HTTP",
            TrackErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind plus optional context fields identifying which stage of
/// a run failed and on what table/path, so failures are diagnosable from
/// the error alone.
#[derive(Debug, Clone)]
pub struct TrackError {
    kind: TrackErrorKind,
    op: Option<String>,
    table: Option<String>,
    key: Option<String>,
    path: Option<String>,
    message: String,
    source: Option<Box<TrackError>>,
}

impl TrackError {
    /// Create a new error with the specified kind
    pub fn new(kind: TrackErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            key: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table name context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add diff-key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add file path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: TrackError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> TrackErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the diff-key context, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&TrackError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}
