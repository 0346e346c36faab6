use crate::filters::{self, Filter, FilterResult};
use crate::objects::Dictionary;
use crate::views::StreamKind;

/// A stream object: its dictionary plus the decoded payload.
///
/// The payload is kept decoded. `/Length` and `/DecodeParms` are dropped on
/// load because the writer recomputes the length and never re-applies a
/// predictor; `/Filter` stays and is re-applied on output.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    dictionary: Dictionary,
    data: Vec<u8>,
    kind: StreamKind,
}

impl Stream {
    pub fn new(dictionary: Dictionary, data: impl Into<Vec<u8>>) -> Self {
        Self {
            dictionary,
            data: data.into(),
            kind: StreamKind::Plain,
        }
    }

    /// Builds a stream from its on-disk payload, running the declared filters.
    pub fn from_encoded(mut dictionary: Dictionary, raw: &[u8]) -> FilterResult<Self> {
        let chain = filters::filter_chain(&dictionary)?;
        let data = filters::decode_all(&chain, raw)?;
        dictionary.remove("Length");
        dictionary.remove("DecodeParms");
        Ok(Self::new(dictionary, data))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }

    /// Decoded payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: StreamKind) {
        self.kind = kind;
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.dictionary
            .set("Filter", crate::objects::Object::Name(filter.to_string()));
    }

    pub fn filters(&self) -> FilterResult<Vec<Filter>> {
        filters::filter_chain(&self.dictionary)
    }

    /// Payload as it must appear on disk, with every declared filter applied.
    pub fn encoded_data(&self) -> FilterResult<Vec<u8>> {
        filters::encode_all(&self.filters()?, &self.data)
    }
}
