//! Two-slot buffer arena
//!
//! One slot is the read source ("current"), the other the write target
//! ("next"). `swap` flips an index; the slots themselves never move.

#[derive(Debug)]
pub struct PingPong<T> {
    slots: [T; 2],
    active: usize,
}

impl<T> PingPong<T> {
    /// `first` starts as the current (read) slot.
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            active: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.slots[self.active]
    }

    pub fn next(&self) -> &T {
        &self.slots[1 - self.active]
    }

    /// `(read, write)` for one pass; the two references never alias.
    pub fn split_mut(&mut self) -> (&T, &mut T) {
        let active = self.active;
        let [a, b] = &mut self.slots;
        if active == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    pub fn swap(&mut self) {
        self.active = 1 - self.active;
    }

    /// Index (0 or 1) of the slot currently being read
    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_flips_roles() {
        let mut pair = PingPong::new("a", "b");
        assert_eq!((*pair.current(), *pair.next()), ("a", "b"));

        pair.swap();
        assert_eq!((*pair.current(), *pair.next()), ("b", "a"));
        assert_eq!(pair.active_slot(), 1);

        pair.swap();
        assert_eq!(pair.active_slot(), 0);
    }

    #[test]
    fn test_split_reads_current_writes_next() {
        let mut pair = PingPong::new(vec![1], vec![2]);
        pair.swap();

        let (read, write) = pair.split_mut();
        assert_eq!(read, &vec![2]);
        write.push(9);

        assert_eq!(pair.next(), &vec![1, 9]);
    }

    #[test]
    fn test_swap_does_not_move_data() {
        let mut pair = PingPong::new(vec![0u8; 4], vec![1u8; 4]);
        let first = pair.current().as_ptr();

        pair.swap();
        pair.swap();
        assert_eq!(pair.current().as_ptr(), first);
    }
}
