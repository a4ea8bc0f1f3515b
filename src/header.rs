use std::fmt;

/// An owned HTTP header stored as a single preformatted `"Name: value"` line,
/// the form the transport consumes directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    data: String,
    colon_pos: usize,
}

impl Header {
    /// Creates a header from a name and value.
    pub fn new(name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let value = value.as_ref();

        let mut data = String::with_capacity(name.len() + value.len() + 2);
        data.push_str(name);
        data.push_str(": ");
        data.push_str(value);

        Self {
            data,
            colon_pos: name.len(),
        }
    }

    /// Creates a header from a full `"Name: value"` line.
    ///
    /// The stored line always carries the two bytes `": "` after the name:
    /// a missing colon or a missing space after the colon is filled in.
    pub fn from_line(line: impl Into<String>) -> Self {
        let mut data = line.into();

        let colon_pos = match data.find(':') {
            None => {
                let pos = data.len();
                data.push_str(": ");
                pos
            }
            Some(pos) if pos == data.len() - 1 => {
                data.push(' ');
                pos
            }
            Some(pos) => {
                if data.as_bytes().get(pos + 1) != Some(&b' ') {
                    data.insert(pos + 1, ' ');
                }
                pos
            }
        };

        Self { data, colon_pos }
    }

    /// The header's name.
    pub fn name(&self) -> &str {
        &self.data[..self.colon_pos]
    }

    /// The header's value, possibly empty.
    pub fn value(&self) -> &str {
        &self.data[self.colon_pos + 2..]
    }

    /// The entire header line, e.g. `"Connection: keep-alive"`.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.data)
    }
}
