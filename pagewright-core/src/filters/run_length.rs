use super::{FilterError, FilterResult, StreamFilter};

const END_OF_DATA: u8 = 128;
const MAX_RECORD: usize = 128;

/// The byte-oriented run-length codec.
///
/// A length byte `n` in `0..=127` is followed by `n + 1` literal bytes; `n` in
/// `129..=255` is followed by one byte repeated `257 - n` times; `128` ends
/// the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthDecode;

impl StreamFilter for RunLengthDecode {
    fn decode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() * 2);
        let mut i = 0;

        while i < data.len() {
            let length = data[i];
            i += 1;
            match length {
                END_OF_DATA => break,
                0..=127 => {
                    let count = length as usize + 1;
                    let literal = data
                        .get(i..i + count)
                        .ok_or(FilterError::Truncated { filter: "RunLengthDecode" })?;
                    output.extend_from_slice(literal);
                    i += count;
                }
                _ => {
                    let byte = *data
                        .get(i)
                        .ok_or(FilterError::Truncated { filter: "RunLengthDecode" })?;
                    let count = 257 - length as usize;
                    output.extend(std::iter::repeat(byte).take(count));
                    i += 1;
                }
            }
        }

        Ok(output)
    }

    /// Greedy encoding: runs of two or more equal bytes become replicate
    /// records, everything else accumulates into literal records. No
    /// end-of-data marker is written.
    fn encode(&self, data: &[u8]) -> FilterResult<Vec<u8>> {
        let mut output = Vec::with_capacity(data.len() + data.len() / MAX_RECORD + 1);
        let mut literal_start = 0;
        let mut i = 0;

        while i < data.len() {
            let mut run = 1;
            while i + run < data.len() && data[i + run] == data[i] && run < MAX_RECORD {
                run += 1;
            }

            if run >= 2 {
                flush_literal(&mut output, &data[literal_start..i]);
                output.push((257 - run) as u8);
                output.push(data[i]);
                i += run;
                literal_start = i;
            } else {
                i += 1;
                if i - literal_start == MAX_RECORD {
                    flush_literal(&mut output, &data[literal_start..i]);
                    literal_start = i;
                }
            }
        }
        flush_literal(&mut output, &data[literal_start..]);

        Ok(output)
    }
}

fn flush_literal(output: &mut Vec<u8>, literal: &[u8]) {
    if literal.is_empty() {
        return;
    }
    output.push((literal.len() - 1) as u8);
    output.extend_from_slice(literal);
}
