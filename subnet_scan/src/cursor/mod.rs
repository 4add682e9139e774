pub mod u32;

/// A position over a finite, non empty sequence.
///
/// Unlike an `Iterator`, reading the current value and advancing are split,
/// so a cursor can stop on its last value without computing the value past
/// it. This is what lets a `u32` sweep end on `0xFF_FF_FF_FF`.
pub trait Cursor {
    type Item;
    fn value(&mut self) -> Self::Item;
    fn move_next(&mut self) -> Result<(), ()>;
    fn is_empty(&self) -> bool {
        false
    }
}

pub struct MapCursor<C: Cursor, F> {
    cursor: C,
    f: F,
}

impl<C: Cursor, B, F> Cursor for MapCursor<C, F>
where
    F: FnMut(C::Item) -> B,
{
    type Item = B;
    fn value(&mut self) -> B {
        let value = self.cursor.value();
        (self.f)(value)
    }
    fn move_next(&mut self) -> Result<(), ()> {
        self.cursor.move_next()
    }
    fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }
}

pub struct CursorIterator<C: Cursor> {
    cursor: C,
    done: bool,
}

impl<C: Cursor> CursorIterator<C> {
    pub fn new(cursor: C) -> Self {
        let done = cursor.is_empty();
        Self { cursor, done }
    }
}

impl<C: Cursor> Iterator for CursorIterator<C> {
    type Item = C::Item;
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            None
        } else {
            let res = Some(self.cursor.value());
            if self.cursor.move_next().is_err() {
                self.done = true;
            }
            res
        }
    }
}

impl<C: Cursor> std::iter::FusedIterator for CursorIterator<C> {}

pub trait CursorExt: Cursor {
    fn to_iter(self) -> CursorIterator<Self>
    where
        Self: Sized,
    {
        CursorIterator::new(self)
    }

    fn map<B, F>(self, f: F) -> MapCursor<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> B,
    {
        MapCursor { cursor: self, f }
    }
}
impl<T: ?Sized> CursorExt for T where T: Cursor {}
