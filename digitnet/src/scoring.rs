use crate::dtype::DType;
use std::fmt::{Display, Formatter};

/// Running count of correctly classified samples.
///
/// A sample counts as correct only when the activation of its label is the
/// unique strict maximum of the output layer, so ties are misses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AccuracyScorer {
    correct: usize,
    total: usize,
}

impl AccuracyScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.correct = 0;
        self.total = 0;
    }

    #[inline]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn process_sample<T: DType>(&mut self, output: &[T], label: usize) {
        if is_unique_max(output, label) {
            self.correct += 1;
        }
        self.total += 1;
    }
}

pub fn is_unique_max<T: DType>(output: &[T], index: usize) -> bool {
    let Some(&value) = output.get(index) else {
        return false;
    };
    output
        .iter()
        .enumerate()
        .all(|(i, &o)| i == index || o < value)
}

/// Index of the first maximal element, `None` for an empty slice.
pub fn max_index<T: DType>(a: &[T]) -> Option<usize> {
    let mut iter = a.iter().enumerate();
    let (mut best, mut best_value) = match iter.next() {
        Some((i, &v)) => (i, v),
        None => return None,
    };
    for (i, &v) in iter {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    Some(best)
}

/// Winning class of a forward pass together with its activation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Prediction<T> {
    pub index: usize,
    pub confidence: T,
}

impl<T: DType> Prediction<T> {
    pub fn from_output(output: &[T]) -> Option<Self> {
        max_index(output).map(|index| Prediction {
            index,
            confidence: output[index],
        })
    }

    #[inline]
    pub fn percent(&self) -> f64 {
        self.confidence.as_f64() * 100.0
    }
}

impl<T: DType> Display for Prediction<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {:.2}%", self.index, self.percent())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accuracy_scorer() {
        let mut scorer = AccuracyScorer::new();
        assert_eq!(scorer.accuracy(), 0.0);

        scorer.process_sample::<f64>(&[0.1, 0.8, 0.3], 1);
        scorer.process_sample::<f64>(&[0.1, 0.8, 0.3], 2);
        // a tie with another neuron is not a hit
        scorer.process_sample::<f64>(&[0.5, 0.5, 0.3], 0);
        scorer.process_sample::<f64>(&[0.9, 0.5, 0.3], 0);

        assert_eq!(scorer.correct(), 2);
        assert_eq!(scorer.total(), 4);
        assert_eq!(scorer.accuracy(), 0.5);

        scorer.reset();
        assert_eq!(scorer.total(), 0);
        assert_eq!(scorer.accuracy(), 0.0);
    }

    #[test]
    fn test_max_index_keeps_first() {
        assert_eq!(max_index::<f64>(&[]), None);
        assert_eq!(max_index(&[0.2f64, 0.7, 0.7, 0.1]), Some(1));
        assert_eq!(max_index(&[0.9f32, 0.7, 0.9]), Some(0));
    }

    #[test]
    fn test_prediction_display() {
        let p = Prediction::from_output(&[0.1f64, 0.971234, 0.2]).unwrap();
        assert_eq!(p.index, 1);
        assert_eq!(p.to_string(), "1 : 97.12%");

        let p = Prediction::from_output(&[0.5f64, 0.25]).unwrap();
        assert_eq!(p.to_string(), "0 : 50.00%");
    }
}
