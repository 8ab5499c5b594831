use crate::OrchestratorError;

pub const DEFAULT_BASE_PORT: u16 = 15000;

/// Highest port handed out before wrapping. Leaves headroom below 65535.
pub const DEFAULT_MAX_PORT: u16 = 65000;

/// Hands out listen ports in sequence, wrapping at the top of the range.
#[derive(Debug, Clone)]
pub struct PortAllocator {
    base: u16,
    max: u16,
    current: u16,
}

impl PortAllocator {
    pub fn new(base: u16, max: u16) -> Result<Self, OrchestratorError> {
        if base >= max {
            return Err(OrchestratorError::InvalidPortRange { base, max });
        }
        Ok(Self {
            base,
            max,
            current: base,
        })
    }

    /// Next port. The first call yields `base + 1`; after `max` it restarts at `base`.
    pub fn next_port(&mut self) -> u16 {
        self.current = if self.current < self.max {
            self.current + 1
        } else {
            self.base
        };
        self.current
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_PORT,
            max: DEFAULT_MAX_PORT,
            current: DEFAULT_BASE_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_from_base() {
        let mut ports = PortAllocator::default();
        assert_eq!(ports.next_port(), 15001);
        assert_eq!(ports.next_port(), 15002);
    }

    #[test]
    fn wraps_at_max() {
        let mut ports = PortAllocator::new(100, 102).unwrap();
        let taken: Vec<u16> = (0..5).map(|_| ports.next_port()).collect();
        assert_eq!(taken, vec![101, 102, 100, 101, 102]);
    }

    #[test]
    fn empty_range_is_rejected() {
        assert!(PortAllocator::new(10, 10).is_err());
    }
}
