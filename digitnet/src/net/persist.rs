use super::{Net, validate_topology};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::net::initializer::NetInitializer;
use crate::util::{parse_tokens, write_tokens};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::iter::once;
use std::mem;
use std::path::Path;

pub const DEFAULT_NETWORK_FILE: &str = "SavedNetwork";

// Text layout, one record per line:
//   L0 L1 ... Ln
//   w[0] w[1] ... w[L(i-1)-1] bias      (for every neuron of layers 1..=n)

impl<T: DType> Net<T> {
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<()> {
        write_tokens(&mut writer, self.layer_sizes().iter())?;
        for layer in self.layers.iter() {
            for (j, &bias) in layer.biases().iter().enumerate() {
                write_tokens(&mut writer, layer.weight_row(j).iter().chain(once(&bias)))?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let result = File::create(path)
            .map_err(Error::from)
            .and_then(|file| self.save_to(BufWriter::new(file)));
        match &result {
            Ok(()) => info!("saved network {:?} to {}", self.layer_sizes(), path.display()),
            Err(err) => warn!("could not save network to {}: {err}", path.display()),
        }
        result
    }

    /// Parses a network written by [`Net::save_to`].
    ///
    /// Every parameter line is read before the network is allocated, so a
    /// header announcing more neurons than the file holds fails on its first
    /// missing line.
    pub fn load_from<R: BufRead>(reader: R, batch_size: usize, learn_rate: T) -> Result<Self> {
        let mut lines = NumberedLines::new(reader.lines());

        let (line_no, header) = lines.next_line()?;
        let sizes: Vec<usize> = parse_tokens(header.split_whitespace(), line_no)?;
        validate_topology::<T>(&sizes)?;

        let mut params = ParsedParams::default();
        for w in sizes.windows(2) {
            let (input_size, size) = (w[0], w[1]);
            let mut weights = Vec::new();
            let mut biases = Vec::new();
            for _ in 0..size {
                let (line_no, line) = lines.next_line()?;
                let values: Vec<T> = parse_tokens(line.split_whitespace(), line_no)?;
                if values.len() != input_size + 1 {
                    return Err(Error::parse(
                        line_no,
                        format!("expected {} weights and a bias, found {} values", input_size, values.len()),
                    ));
                }
                weights.extend_from_slice(&values[..input_size]);
                biases.push(values[input_size]);
            }
            params.weights.push(weights);
            params.biases.push(biases);
        }
        Net::with_initializer(&sizes, batch_size, learn_rate, &mut params)
    }

    pub fn load<P: AsRef<Path>>(path: P, batch_size: usize, learn_rate: T) -> Result<Self> {
        let path = path.as_ref();
        let result = File::open(path)
            .map_err(Error::from)
            .and_then(|file| Self::load_from(BufReader::new(file), batch_size, learn_rate));
        match &result {
            Ok(net) => info!("loaded network {:?} from {}", net.layer_sizes(), path.display()),
            Err(err) => warn!("could not load network from {}: {err}", path.display()),
        }
        result
    }

    /// Replaces topology and parameters with the parsed network, keeping the
    /// batch size and learning rate. On error `self` is left as it was.
    pub fn reload_from<R: BufRead>(&mut self, reader: R) -> Result<()> {
        *self = Self::load_from(reader, self.batch_size, self.learn_rate)?;
        Ok(())
    }

    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        *self = Self::load(path, self.batch_size, self.learn_rate)?;
        Ok(())
    }
}

/// Parameters read from a network file, handed out once per layer.
struct ParsedParams<T> {
    weights: Vec<Vec<T>>,
    biases: Vec<Vec<T>>,
}

impl<T> Default for ParsedParams<T> {
    fn default() -> Self {
        ParsedParams {
            weights: Vec::new(),
            biases: Vec::new(),
        }
    }
}

impl<T: DType> NetInitializer<T> for ParsedParams<T> {
    fn get_weights(&mut self, layer_idx: usize, _input_size: usize, _output_size: usize) -> Vec<T> {
        self.weights.get_mut(layer_idx - 1).map(mem::take).unwrap_or_default()
    }

    fn get_biases(&mut self, layer_idx: usize, _size: usize) -> Vec<T> {
        self.biases.get_mut(layer_idx - 1).map(mem::take).unwrap_or_default()
    }
}

struct NumberedLines<B> {
    lines: Lines<B>,
    line_no: usize,
}

impl<B: BufRead> NumberedLines<B> {
    fn new(lines: Lines<B>) -> Self {
        NumberedLines { lines, line_no: 0 }
    }

    fn next_line(&mut self) -> Result<(usize, String)> {
        self.line_no += 1;
        match self.lines.next() {
            Some(line) => Ok((self.line_no, line?)),
            None => Err(Error::parse(self.line_no, "unexpected end of file")),
        }
    }
}
