use super::decode::Error;

pub(crate) fn to_array<const N: usize>(data: &[u8]) -> Result<[u8; N], Error> {
    match data.len().cmp(&N) {
        std::cmp::Ordering::Less => Err(Error::NotEnoughData),
        std::cmp::Ordering::Equal => Ok(data.try_into().unwrap()),
        std::cmp::Ordering::Greater => Ok(data[0..N].try_into().unwrap()),
    }
}

#[inline]
pub(crate) fn load_u8(data: &[u8]) -> Result<u8, Error> {
    data.first().copied().ok_or(Error::NotEnoughData)
}

#[inline]
pub(crate) fn load_u16(data: &[u8]) -> Result<u16, Error> {
    Ok(u16::from_be_bytes(to_array(data)?))
}

#[inline]
pub(crate) fn load_u32(data: &[u8]) -> Result<u32, Error> {
    Ok(u32::from_be_bytes(to_array(data)?))
}

#[inline]
pub(crate) fn load_u64(data: &[u8]) -> Result<u64, Error> {
    Ok(u64::from_be_bytes(to_array(data)?))
}

/// Load an IEEE-754 binary16 value, expanded to binary32.
#[inline]
pub(crate) fn load_float2(data: &[u8]) -> Result<f32, Error> {
    Ok(half::f16::from_be_bytes(to_array(data)?).to_f32())
}

#[inline]
pub(crate) fn load_float4(data: &[u8]) -> Result<f32, Error> {
    Ok(f32::from_be_bytes(to_array(data)?))
}

#[inline]
pub(crate) fn load_float8(data: &[u8]) -> Result<f64, Error> {
    Ok(f64::from_be_bytes(to_array(data)?))
}
