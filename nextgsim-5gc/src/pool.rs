//! UE address pool
//!
//! Addresses are handed out sequentially after a cursor that only moves
//! forward. Released addresses are not returned to the pool.

use std::net::Ipv4Addr;
use std::sync::{Mutex, PoisonError};

use nextgsim_common::{AddressPoolConfig, Ipv4Block};
use tracing::trace;

use crate::error::PoolError;

/// Sequential IPv4 allocator bounded to a block.
///
/// The read, increment and persist of the cursor happen under one lock, so
/// concurrent callers never receive the same address.
#[derive(Debug)]
pub struct AddressPool {
    block: Ipv4Block,
    cursor: Mutex<Ipv4Addr>,
}

impl AddressPool {
    /// Create a pool whose first allocation is the address after `last_allocated`.
    pub fn new(block: Ipv4Block, last_allocated: Ipv4Addr) -> Result<Self, PoolError> {
        if !block.contains(last_allocated) {
            return Err(PoolError::CursorOutsideBlock {
                block,
                cursor: last_allocated,
            });
        }
        Ok(Self {
            block,
            cursor: Mutex::new(last_allocated),
        })
    }

    /// Create a pool from its configuration section
    pub fn from_config(config: &AddressPoolConfig) -> Result<Self, PoolError> {
        Self::new(config.subnet, config.last_allocated)
    }

    /// Block the pool draws from
    pub fn block(&self) -> Ipv4Block {
        self.block
    }

    /// Allocate the next address.
    ///
    /// On exhaustion the cursor is left unchanged.
    pub fn next(&self) -> Result<Ipv4Addr, PoolError> {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let next = u32::from(*cursor)
            .checked_add(1)
            .map(Ipv4Addr::from)
            .filter(|addr| self.block.contains(*addr))
            .ok_or(PoolError::Exhausted {
                block: self.block,
                last: *cursor,
            })?;
        *cursor = next;
        trace!(addr = %next, block = %self.block, "allocated UE address");
        Ok(next)
    }

    /// Last address handed out (or the configured starting cursor)
    pub fn last_allocated(&self) -> Ipv4Addr {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
