#[derive(Debug)]
pub enum CacheOperation {
    Put(u8, u8),
    Get(u8),
    GetMut(u8, u8),
    Peek(u8),
    Remove(u8),
    PopOldest,
    Clear,
    Print,
}

impl<'a> arbitrary::Arbitrary<'a> for CacheOperation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match u.int_in_range(0..=7)? {
            0 => Ok(CacheOperation::Put(u.arbitrary()?, u.arbitrary()?)),
            1 => Ok(CacheOperation::Get(u.arbitrary()?)),
            2 => Ok(CacheOperation::GetMut(u.arbitrary()?, u.arbitrary()?)),
            3 => Ok(CacheOperation::Peek(u.arbitrary()?)),
            4 => Ok(CacheOperation::Remove(u.arbitrary()?)),
            5 => Ok(CacheOperation::PopOldest),
            6 => Ok(CacheOperation::Clear),
            7 => Ok(CacheOperation::Print),
            _ => unreachable!(),
        }
    }
}

#[derive(Debug)]
pub enum IndexOperation {
    Insert(u16, u16),
    Take(u16),
    Find(u16),
    Expand,
    Clear,
}

impl<'a> arbitrary::Arbitrary<'a> for IndexOperation {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        match u.int_in_range(0..=9)? {
            0..=4 => Ok(IndexOperation::Insert(u.arbitrary()?, u.arbitrary()?)),
            5 | 6 => Ok(IndexOperation::Take(u.arbitrary()?)),
            7 => Ok(IndexOperation::Find(u.arbitrary()?)),
            8 => Ok(IndexOperation::Expand),
            9 => Ok(IndexOperation::Clear),
            _ => unreachable!(),
        }
    }
}
