use std::fmt::{Display, Formatter};
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    InvalidTopology(Vec<usize>),
    InvalidBatchSize(usize),
    InputShapeMismatch {
        expected: usize,
        actual: usize,
    },
    LabelOutOfRange {
        label: usize,
        classes: usize,
    },
    /// An initializer produced the wrong number of parameters for a layer.
    InvalidParameters {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    EmptyLabel(usize),
    Parse {
        line: usize,
        msg: String,
    },
    Persistence(io::Error),
    #[cfg(feature = "serde")]
    Config(serde_json::Error),
}

impl Error {
    pub fn parse<M>(line: usize, msg: M) -> Self where M: Into<String> {
        Error::Parse {
            line,
            msg: msg.into(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidTopology(sizes) => {
                write!(f, "invalid topology {sizes:?}, need at least two non-empty layers")
            }
            Error::InvalidBatchSize(size) => write!(f, "invalid batch size {size}"),
            Error::InputShapeMismatch { expected, actual } => {
                write!(f, "input has {actual} values, the input layer expects {expected}")
            }
            Error::LabelOutOfRange { label, classes } => {
                write!(f, "label {label} is out of range for {classes} classes")
            }
            Error::InvalidParameters { layer, expected, actual } => {
                write!(f, "layer {layer} needs {expected} parameters, the initializer gave {actual}")
            }
            Error::EmptyLabel(label) => write!(f, "no samples stored for label {label}"),
            Error::Parse { line, msg } => write!(f, "parse error on line {line}: {msg}"),
            Error::Persistence(err) => write!(f, "i/o error: {err}"),
            #[cfg(feature = "serde")]
            Error::Config(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Persistence(err) => Some(err),
            #[cfg(feature = "serde")]
            Error::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Persistence(value)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Config(value)
    }
}
