// fixed length bit set, used as the settled/visited marks of dense traversals
pub(crate) struct BitSet {
    size:usize,
    bytes:Vec<u8>
}

impl BitSet {
    pub(crate) fn with_len(size:usize) -> Self {
        let byte_len = size.div_ceil(8);
        Self {
            size,
            bytes:vec![0;byte_len]
        }
    }
    pub(crate) fn contains(&self,index:usize) -> bool {
        if index >= self.size {return false}
        let byte_pos = index / 8;
        let pos_in_byte = index % 8;
        let mask = 1u8 << pos_in_byte;
        self.bytes.get(byte_pos).is_some_and(|byte| *byte & mask > 0)
    }
    // true when the bit was not set before
    pub(crate) fn insert(&mut self,index:usize) -> bool {
        if index >= self.size {return false}
        let byte_pos = index / 8;
        let pos_in_byte = index % 8;
        let Some(byte) = self.bytes.get_mut(byte_pos) else {return false};
        let mask = 1u8 << pos_in_byte;
        let was_set = *byte & mask > 0;
        *byte |= mask;
        !was_set
    }
    pub(crate) fn count_ones(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests{
    use super::BitSet;
    #[test]
    fn test_insert() {
        let mut set = BitSet::with_len(114514);
        assert!(!set.contains(10000));
        assert!(set.insert(10000));
        assert!(!set.insert(10000));
        assert!(set.contains(10000));
        assert!(set.insert(114513));
        assert!(!set.insert(114514));
        assert!(!set.contains(114514));
        assert_eq!(set.count_ones(),2);
    }
    #[test]
    fn test_empty() {
        let mut set = BitSet::with_len(0);
        assert!(!set.insert(0));
        assert_eq!(set.count_ones(),0);
    }
}
