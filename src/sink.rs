//! Collects the chunks that the codec delivers during one decompression call.
//! Every chunk is copied into owned storage before the callback returns,
//! because the codec reuses the memory behind it.

#[derive(Debug, Default)]
pub struct ChunkSink {
    /// Owned copies of the delivered chunks, in delivery order.
    chunks: Vec<Vec<u8>>,
    /// The number of bytes accepted so far.
    len: usize,
    /// The maximum number of bytes to accept, if any.
    limit: Option<usize>,
    /// Set when a chunk was refused because of 'limit'.
    overflowed: bool,
}

impl ChunkSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that refuses chunks once 'limit' bytes were accepted.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Copy 'chunk' into the sink and return the number of bytes consumed.
    /// A chunk is either taken whole or refused whole (zero is returned).
    pub fn accept(&mut self, chunk: &[u8]) -> usize {
        if let Some(limit) = self.limit {
            if chunk.len() > limit - self.len {
                self.overflowed = true;
                return 0;
            }
        }
        self.chunks.push(chunk.to_vec());
        self.len += chunk.len();
        chunk.len()
    }

    /// Returns true if a chunk was refused for lack of capacity.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the number of bytes accepted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of chunks accepted so far.
    #[must_use]
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Join the chunks in the order they were delivered.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.len);
        for chunk in self.chunks {
            output.extend_from_slice(&chunk);
        }
        output
    }
}
