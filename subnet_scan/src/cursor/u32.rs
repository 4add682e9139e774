/// Walks `first..=last` without ever computing `last + 1`.
pub struct U32Cursor {
    index: u32,
    first: u32,
    last: u32,
}

impl U32Cursor {
    /// An empty cursor when `first > last`.
    pub fn new(first: u32, last: u32) -> Self {
        Self {
            index: first,
            first,
            last,
        }
    }
}

impl super::Cursor for U32Cursor {
    type Item = u32;
    fn value(&mut self) -> Self::Item {
        self.index
    }
    fn move_next(&mut self) -> Result<(), ()> {
        if self.index >= self.last {
            return Err(());
        }
        self.index += 1;
        Ok(())
    }
    fn is_empty(&self) -> bool {
        self.first > self.last
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cursor::CursorExt;

    #[test]
    fn inclusive_bounds() {
        let values: Vec<_> = U32Cursor::new(0, 3).to_iter().collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn ends_on_u32_max() {
        let values: Vec<_> = U32Cursor::new(0xFF_FF_FF_FD, 0xFF_FF_FF_FF)
            .to_iter()
            .collect();
        assert_eq!(values, vec![0xFF_FF_FF_FD, 0xFF_FF_FF_FE, 0xFF_FF_FF_FF]);
    }

    #[test]
    fn single_value_at_u32_max() {
        let mut iter = U32Cursor::new(0xFF_FF_FF_FF, 0xFF_FF_FF_FF).to_iter();
        assert_eq!(iter.next(), Some(0xFF_FF_FF_FF));
        assert_eq!(iter.next(), None);
    }
}
