/// Inclusive block range covered by one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
    pub start_block: u64,
    pub end_block: u64,
}

/// One eth_getLogs query range; a sequence of these partitions a window
/// exactly, no gaps, no overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    pub from_block: u64,
    pub to_block: u64,
}

impl BlockWindow {
    /// Window reaching `lookback_blocks` behind the current height, clamped
    /// to genesis (block 0) when the chain is younger than the lookback.
    pub fn lookback(current_height: u64, lookback_blocks: u64) -> Self {
        Self {
            start_block: current_height.saturating_sub(lookback_blocks),
            end_block: current_height,
        }
    }

    /// Number of blocks in the window, both bounds inclusive
    pub fn len(&self) -> u64 {
        self.end_block - self.start_block + 1
    }

    /// Lazily partition the window into fixed-size batches. Every batch spans
    /// exactly `batch_size` blocks except possibly the last, which is clipped
    /// to the window's end block.
    pub fn batches(&self, batch_size: u64) -> BatchIter {
        BatchIter {
            next_block: self.start_block,
            end_block: self.end_block,
            batch_size: batch_size.max(1),
            exhausted: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchIter {
    next_block: u64,
    end_block: u64,
    batch_size: u64,
    exhausted: bool,
}

impl Iterator for BatchIter {
    type Item = BatchRange;

    fn next(&mut self) -> Option<BatchRange> {
        if self.exhausted {
            return None;
        }

        let from_block = self.next_block;
        let to_block = from_block
            .saturating_add(self.batch_size - 1)
            .min(self.end_block);

        if to_block == self.end_block {
            self.exhausted = true;
        } else {
            self.next_block = to_block + 1;
        }

        Some(BatchRange {
            from_block,
            to_block,
        })
    }
}
