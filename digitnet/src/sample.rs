use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::util::parse_tokens;
use std::fmt::{Display, Formatter};

/// A labelled training example: the class and the flattened canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<T> {
    pub label: usize,
    pub features: Vec<T>,
}

impl<T: DType> Sample<T> {
    pub fn new(label: usize, features: Vec<T>) -> Self {
        Sample { label, features }
    }

    /// Parses a `label f_0 f_1 ...` line. `line_no` is only used in errors.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let Some(label) = tokens.next() else {
            return Err(Error::parse(line_no, "empty sample line"));
        };
        let label = label
            .parse::<usize>()
            .map_err(|_| Error::parse(line_no, format!("malformed label {label:?}")))?;
        let features = parse_tokens(tokens, line_no)?;
        Ok(Sample { label, features })
    }
}

impl<T: DType> Display for Sample<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)?;
        for x in &self.features {
            write!(f, " {x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Sample;
    use crate::error::Error;

    #[test]
    fn test_line_codec() {
        let sample = Sample::new(7, vec![0.0f64, 1.0, 0.5, 0.125]);
        let line = sample.to_string();
        assert_eq!(line, "7 0 1 0.5 0.125");
        assert_eq!(Sample::<f64>::parse(&line, 1).unwrap(), sample);
    }

    #[test]
    fn test_parse_tolerates_spacing() {
        let sample = Sample::<f32>::parse("  3 0.25   1 ", 4).unwrap();
        assert_eq!(sample.label, 3);
        assert_eq!(sample.features, vec![0.25, 1.0]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Sample::<f64>::parse("", 2), Err(Error::Parse { line: 2, .. })));
        assert!(matches!(Sample::<f64>::parse("x 0.1", 1), Err(Error::Parse { .. })));
        assert!(matches!(Sample::<f64>::parse("-1 0.1", 1), Err(Error::Parse { .. })));
        assert!(matches!(Sample::<f64>::parse("1 0.1 ,5", 9), Err(Error::Parse { line: 9, .. })));
    }
}
