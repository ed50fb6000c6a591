use std::{fmt::Debug, mem::MaybeUninit, ops::Deref};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// Inline vector with a fixed capacity of `N` `Copy` elements.
/// Keeps turn state `Copy`-cheap: the pip bag and the turn log never hold
/// more than four entries.
#[derive(Clone, Copy)]
pub struct TinyVec<T, const N: usize>
where
    T: Copy,
{
    buf: [MaybeUninit<T>; N],
    len: u8,
}

impl<T, const N: usize> TinyVec<T, N>
where
    T: Copy,
{
    pub const fn new() -> Self {
        const { assert!(N <= 255, "TinyVec supports up to 255 elements") }
        TinyVec { buf: [const { MaybeUninit::uninit() }; N], len: 0 }
    }

    pub fn is_full(&self) -> bool {
        self.len as usize == N
    }

    /// Appends `val`. Panics when the vector is full.
    pub fn push(&mut self, val: T) {
        assert!(!self.is_full(), "TinyVec holds at most {N} elements");
        self.buf[self.len as usize].write(val);
        self.len += 1;
    }

    /// Appends `val`, handing it back if the vector is full.
    pub fn try_push(&mut self, val: T) -> Result<(), T> {
        if self.is_full() {
            return Err(val);
        }
        self.buf[self.len as usize].write(val);
        self.len += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Removes the first element equal to `val`, keeping the order of the rest.
    pub fn remove_first(&mut self, val: &T) -> bool
    where
        T: PartialEq,
    {
        let Some(pos) = self.iter().position(|x| x == val) else {
            return false;
        };
        let len = self.len as usize;
        self.buf.copy_within(pos + 1..len, pos);
        self.len -= 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Copy, const N: usize> Default for TinyVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> Deref for TinyVec<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Only the first `self.len` elements are initialized
        unsafe {
            std::slice::from_raw_parts(self.buf.as_ptr() as *const T, self.len as usize)
        }
    }
}

impl<T: Copy + PartialEq, const N: usize> PartialEq for TinyVec<T, N> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Copy + Eq, const N: usize> Eq for TinyVec<T, N> {}

impl<T: Copy + Debug, const N: usize> Debug for TinyVec<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy + Serialize, const N: usize> Serialize for TinyVec<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Copy + Deserialize<'de>, const N: usize> Deserialize<'de> for TinyVec<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let len = items.len();
        let mut vec = TinyVec::new();
        for item in items {
            vec.try_push(item)
                .map_err(|_| D::Error::invalid_length(len, &format!("at most {N} elements").as_str()))?;
        }
        Ok(vec)
    }
}
