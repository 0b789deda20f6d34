pub type Byte = u8;
pub type Address = u16;

pub const KB: usize = 0x400;

#[inline]
pub fn bit_eq<T: std::ops::BitAnd<Output = T> + PartialEq + Copy>(a: T, b: T) -> bool {
  (a & b) == b
}

#[cfg(test)]
mod tests {
  use super::bit_eq;

  #[test]
  fn bit_eq_test() {
    assert!(bit_eq(0xC0u8, 0x40));
    assert!(bit_eq(0xC0u8, 0xC0));
    assert!(!bit_eq(0x80u8, 0x40));
    assert!(bit_eq(0x1000u16, 0x1000));
    assert!(!bit_eq(0x0fffu16, 0x1000));
  }
}
