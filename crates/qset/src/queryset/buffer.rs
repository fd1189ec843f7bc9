//! Buffered operations and their precedence rules.
//!
//! A query-set layer buffers at most one filter, one ordering, one skip count
//! and one take count. [`RULES`] decides, for an incoming operation and each
//! operation already buffered, whether the two can share the layer or the
//! layer has to be wrapped into a sub-query first.

use crate::sql::SqlFragment;

/// Kind of a bufferable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Where = 0,
    OrderBy = 1,
    Skip = 2,
    Take = 3,
}

impl Op {
    pub const ALL: [Op; 4] = [Op::Where, Op::OrderBy, Op::Skip, Op::Take];
}

/// What happens when an operation meets one already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Independent clauses; both stay.
    Keep,
    /// Merge into a single buffered value.
    Combine,
    /// The incoming value supersedes the buffered one.
    Replace,
    /// The layer is closed into a sub-query before applying the operation.
    Wrap,
}

use Action::{Combine, Keep, Replace, Wrap};

/// `RULES[incoming][buffered]`.
pub const RULES: [[Action; 4]; 4] = [
    //            Where    OrderBy  Skip     Take
    /* Where   */ [Combine, Keep, Wrap, Wrap],
    /* OrderBy */ [Keep, Replace, Wrap, Wrap],
    /* Skip    */ [Keep, Keep, Combine, Combine],
    /* Take    */ [Keep, Keep, Keep, Combine],
];

/// Rule for `incoming` against `buffered`.
pub fn action(incoming: Op, buffered: Op) -> Action {
    RULES[incoming as usize][buffered as usize]
}

/// An operation with its payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BufferedOp {
    Where(SqlFragment),
    OrderBy(SqlFragment),
    Skip(u64),
    Take(u64),
}

impl BufferedOp {
    pub(crate) fn kind(&self) -> Op {
        match self {
            BufferedOp::Where(_) => Op::Where,
            BufferedOp::OrderBy(_) => Op::OrderBy,
            BufferedOp::Skip(_) => Op::Skip,
            BufferedOp::Take(_) => Op::Take,
        }
    }
}

/// Operations not yet compiled into SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Buffer {
    pub(crate) where_: Option<SqlFragment>,
    pub(crate) order_by: Option<SqlFragment>,
    pub(crate) skip: Option<u64>,
    pub(crate) take: Option<u64>,
}

impl Buffer {
    pub(crate) fn is_empty(&self) -> bool {
        self.buffered().next().is_none()
    }

    pub(crate) fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }

    pub(crate) fn has(&self, op: Op) -> bool {
        match op {
            Op::Where => self.where_.is_some(),
            Op::OrderBy => self.order_by.is_some(),
            Op::Skip => self.skip.is_some(),
            Op::Take => self.take.is_some(),
        }
    }

    pub(crate) fn buffered(&self) -> impl Iterator<Item = Op> + '_ {
        Op::ALL.into_iter().filter(|op| self.has(*op))
    }

    /// Whether `incoming` must be applied to a fresh layer.
    pub(crate) fn needs_wrap(&self, incoming: Op) -> bool {
        self.buffered().any(|b| action(incoming, b) == Wrap)
    }

    /// Apply an operation that does not need a wrap.
    pub(crate) fn apply(&mut self, op: BufferedOp) {
        debug_assert!(!self.needs_wrap(op.kind()));
        match op {
            BufferedOp::Where(f) => {
                self.where_ = Some(match self.where_.take() {
                    Some(w) => w.parenthesized().join(" AND ", &f.parenthesized()),
                    None => f,
                });
            }
            BufferedOp::OrderBy(f) => self.order_by = Some(f),
            BufferedOp::Skip(n) => {
                // Skipping inside an existing page shrinks what is left of it.
                self.take = self.take.map(|t| t.saturating_sub(n));
                self.skip = Some(self.skip.unwrap_or(0).saturating_add(n));
            }
            BufferedOp::Take(n) => {
                self.take = Some(self.take.map_or(n, |t| t.min(n)));
            }
        }
    }
}
