//! 夹具数据区存储
//!
//! 四个数据区各自是一段连续地址空间 `[start, start + size)`。
//! 读写请求必须完整落在区内，否则返回 [`ProtocolError::OutOfRange`]。

use crate::error::ProtocolError;
use crate::types::{RegionKind, RegionLayout};
use std::ops::Range;

#[derive(Debug, Clone)]
struct Region<T> {
    kind: RegionKind,
    start: u16,
    values: Vec<T>,
}

impl<T: Copy> Region<T> {
    fn seeded(kind: RegionKind, start: u16, size: u16, seed: T) -> Self {
        Self {
            kind,
            start,
            values: vec![seed; size as usize],
        }
    }

    fn span(&self, address: u16, count: u16) -> Result<Range<usize>, ProtocolError> {
        let out_of_range = || ProtocolError::OutOfRange {
            region: self.kind,
            address,
            count,
        };
        if count == 0 {
            return Err(out_of_range());
        }
        let offset = address.checked_sub(self.start).ok_or_else(out_of_range)? as usize;
        let end = offset + count as usize;
        if end > self.values.len() {
            return Err(out_of_range());
        }
        Ok(offset..end)
    }

    fn read(&self, address: u16, count: u16) -> Result<Vec<T>, ProtocolError> {
        let span = self.span(address, count)?;
        Ok(self.values[span].to_vec())
    }

    fn write(&mut self, address: u16, values: &[T]) -> Result<(), ProtocolError> {
        let count = u16::try_from(values.len()).map_err(|_| ProtocolError::OutOfRange {
            region: self.kind,
            address,
            count: u16::MAX,
        })?;
        let span = self.span(address, count)?;
        self.values[span].copy_from_slice(values);
        Ok(())
    }
}

/// 夹具的四个数据区
#[derive(Debug, Clone)]
pub struct DataRegions {
    coils: Region<bool>,
    discrete_inputs: Region<bool>,
    holding_registers: Region<u16>,
    input_registers: Region<u16>,
}

impl DataRegions {
    /// 按布局创建并预置数据区
    pub fn seeded(layout: &RegionLayout) -> Self {
        let coils = &layout.coils;
        let discrete = &layout.discrete_inputs;
        let holding = &layout.holding_registers;
        let input = &layout.input_registers;
        Self {
            coils: Region::seeded(RegionKind::Coils, coils.start, coils.size, coils.seed),
            discrete_inputs: Region::seeded(
                RegionKind::DiscreteInputs,
                discrete.start,
                discrete.size,
                discrete.seed,
            ),
            holding_registers: Region::seeded(
                RegionKind::HoldingRegisters,
                holding.start,
                holding.size,
                holding.seed,
            ),
            input_registers: Region::seeded(
                RegionKind::InputRegisters,
                input.start,
                input.size,
                input.seed,
            ),
        }
    }

    pub fn read_coils(&self, address: u16, count: u16) -> Result<Vec<bool>, ProtocolError> {
        self.coils.read(address, count)
    }

    pub fn read_discrete_inputs(
        &self,
        address: u16,
        count: u16,
    ) -> Result<Vec<bool>, ProtocolError> {
        self.discrete_inputs.read(address, count)
    }

    pub fn read_holding_registers(
        &self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.holding_registers.read(address, count)
    }

    pub fn read_input_registers(
        &self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        self.input_registers.read(address, count)
    }

    pub fn write_coils(&mut self, address: u16, values: &[bool]) -> Result<(), ProtocolError> {
        self.coils.write(address, values)
    }

    pub fn write_holding_registers(
        &mut self,
        address: u16,
        values: &[u16],
    ) -> Result<(), ProtocolError> {
        self.holding_registers.write(address, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordRegionSpec;

    #[test]
    fn test_seeded_regions() {
        let regions = DataRegions::seeded(&RegionLayout::uniform(10, true, 17));
        assert_eq!(regions.read_coils(0, 3).unwrap(), vec![true; 3]);
        assert_eq!(regions.read_discrete_inputs(9, 1).unwrap(), vec![true]);
        assert_eq!(regions.read_holding_registers(0, 10).unwrap(), vec![17; 10]);
        assert_eq!(regions.read_input_registers(5, 2).unwrap(), vec![17, 17]);
    }

    #[test]
    fn test_out_of_range() {
        let regions = DataRegions::seeded(&RegionLayout::uniform(10, false, 0));
        // 跨越末尾
        assert!(matches!(
            regions.read_holding_registers(8, 3),
            Err(ProtocolError::OutOfRange {
                region: RegionKind::HoldingRegisters,
                address: 8,
                count: 3
            })
        ));
        // 数量为零
        assert!(regions.read_coils(0, 0).is_err());
        // 靠近 u16 上限
        assert!(regions.read_input_registers(u16::MAX, 2).is_err());
    }

    #[test]
    fn test_region_with_offset_start() {
        let layout = RegionLayout {
            holding_registers: WordRegionSpec {
                start: 100,
                size: 5,
                seed: 1,
            },
            ..RegionLayout::default()
        };
        let regions = DataRegions::seeded(&layout);
        assert!(regions.read_holding_registers(99, 1).is_err());
        assert_eq!(regions.read_holding_registers(100, 5).unwrap(), vec![1; 5]);
        assert!(regions.read_holding_registers(104, 2).is_err());
    }

    #[test]
    fn test_writes_are_visible() {
        let mut regions = DataRegions::seeded(&RegionLayout::default());
        regions.write_holding_registers(3, &[1, 2, 3]).unwrap();
        regions.write_coils(0, &[false, true]).unwrap();
        assert_eq!(regions.read_holding_registers(2, 5).unwrap(), vec![17, 1, 2, 3, 17]);
        assert_eq!(regions.read_coils(0, 3).unwrap(), vec![false, true, true]);
        assert!(regions.write_holding_registers(99, &[0, 0]).is_err());
    }
}
