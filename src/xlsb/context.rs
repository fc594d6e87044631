//! Context stack tracking nested future-record and alternate-content blocks.
//!
//! The stack decides which vocabulary a type code is resolved against.
//! Begin markers resolve in the enclosing context and only then push; end
//! markers pop. The stack is empty at the start and at the end of a
//! well-formed part.

use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::record_types::{BinaryRecordType, RecordType};
use smallvec::SmallVec;

/// Kind of block that changes the active record vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordContext {
    /// Inside `BrtFRTBegin` .. `BrtFRTEnd`
    FutureRecord,
    /// Inside `BrtACBegin` .. `BrtACEnd`
    AlternateContent,
}

impl RecordContext {
    /// Record opening a block of this kind.
    pub fn begin_marker(self) -> BinaryRecordType {
        match self {
            RecordContext::FutureRecord => BinaryRecordType::FRTBegin,
            RecordContext::AlternateContent => BinaryRecordType::ACBegin,
        }
    }

    /// Record closing a block of this kind.
    pub fn end_marker(self) -> BinaryRecordType {
        match self {
            RecordContext::FutureRecord => BinaryRecordType::FRTEnd,
            RecordContext::AlternateContent => BinaryRecordType::ACEnd,
        }
    }
}

/// Resolve a raw type code given the innermost open block.
///
/// The primary namespace always wins. A miss resolves into the namespace
/// of `top`; with no open block a miss is `None`.
pub fn resolve_record_type(code: u16, top: Option<RecordContext>) -> Option<RecordType> {
    if let Some(t) = BinaryRecordType::from_code(code) {
        return Some(RecordType::Primary(t));
    }
    match top? {
        RecordContext::FutureRecord => Some(RecordType::FutureRecord(code)),
        RecordContext::AlternateContent => Some(RecordType::AlternateContent(code)),
    }
}

/// LIFO of open vocabulary blocks for one decoding pass.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    stack: SmallVec<[RecordContext; 4]>,
}

impl ContextStack {
    /// Create an empty stack (root context).
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost open block, if any.
    #[inline]
    pub fn top(&self) -> Option<RecordContext> {
        self.stack.last().copied()
    }

    /// Nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether no block is open.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Resolve `code` against the current top and then apply the
    /// begin/end transition of the resolved type.
    pub fn resolve(&mut self, code: u16) -> XlsbResult<RecordType> {
        let record_type =
            resolve_record_type(code, self.top()).ok_or(XlsbError::UnknownRecordType(code))?;
        self.advance(record_type)?;
        Ok(record_type)
    }

    /// Apply the stack transition for an already resolved record type.
    pub fn advance(&mut self, record_type: RecordType) -> XlsbResult<()> {
        let Some(t) = record_type.primary() else {
            return Ok(());
        };
        match t {
            BinaryRecordType::FRTBegin => self.push(RecordContext::FutureRecord),
            BinaryRecordType::ACBegin => self.push(RecordContext::AlternateContent),
            BinaryRecordType::FRTEnd => self.pop(record_type, RecordContext::FutureRecord)?,
            BinaryRecordType::ACEnd => self.pop(record_type, RecordContext::AlternateContent)?,
            _ => {},
        }
        Ok(())
    }

    fn push(&mut self, context: RecordContext) {
        self.stack.push(context);
        log::debug!("entered {:?} block, depth {}", context, self.stack.len());
    }

    // An end marker closes only a block of its own kind.
    fn pop(&mut self, end: RecordType, context: RecordContext) -> XlsbResult<()> {
        match self.top() {
            Some(top) if top == context => {
                self.stack.pop();
                log::debug!("left {:?} block, depth {}", context, self.stack.len());
                Ok(())
            },
            Some(top) => Err(XlsbError::unexpected(end, [top.end_marker()])),
            None => Err(XlsbError::unexpected(end, [context.begin_marker()])),
        }
    }

    /// Drop all open blocks.
    pub fn reset(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Not in the primary namespace
    const SHARED_CODE: u16 = 3000;

    #[test]
    fn test_primary_wins_inside_blocks() {
        let mut stack = ContextStack::new();
        stack.resolve(BinaryRecordType::FRTBegin.code()).unwrap();
        assert_eq!(
            stack.resolve(0x0081).unwrap(),
            RecordType::Primary(BinaryRecordType::BeginSheet)
        );
    }

    #[test]
    fn test_ambiguous_code_follows_top_of_stack() {
        let mut stack = ContextStack::new();
        assert!(matches!(
            stack.resolve(SHARED_CODE),
            Err(XlsbError::UnknownRecordType(SHARED_CODE))
        ));

        stack.resolve(BinaryRecordType::FRTBegin.code()).unwrap();
        assert_eq!(stack.resolve(SHARED_CODE).unwrap(), RecordType::FutureRecord(SHARED_CODE));

        stack.resolve(BinaryRecordType::ACBegin.code()).unwrap();
        assert_eq!(
            stack.resolve(SHARED_CODE).unwrap(),
            RecordType::AlternateContent(SHARED_CODE)
        );

        stack.resolve(BinaryRecordType::ACEnd.code()).unwrap();
        assert_eq!(stack.resolve(SHARED_CODE).unwrap(), RecordType::FutureRecord(SHARED_CODE));

        stack.resolve(BinaryRecordType::FRTEnd.code()).unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_begin_marker_pushes_after_resolving() {
        let mut stack = ContextStack::new();
        let t = stack.resolve(BinaryRecordType::ACBegin.code()).unwrap();
        assert_eq!(t, RecordType::Primary(BinaryRecordType::ACBegin));
        assert_eq!(stack.top(), Some(RecordContext::AlternateContent));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_unmatched_end_is_unexpected_record() {
        let mut stack = ContextStack::new();
        match stack.resolve(BinaryRecordType::ACEnd.code()) {
            Err(XlsbError::UnexpectedRecord { found, expected }) => {
                assert_eq!(found, BinaryRecordType::ACEnd);
                assert_eq!(expected.as_slice(), &[RecordType::from(BinaryRecordType::ACBegin)]);
            },
            other => panic!("expected UnexpectedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_end_must_match_open_block() {
        let mut stack = ContextStack::new();
        stack.resolve(BinaryRecordType::FRTBegin.code()).unwrap();
        match stack.resolve(BinaryRecordType::ACEnd.code()) {
            Err(XlsbError::UnexpectedRecord { found, expected }) => {
                assert_eq!(found, BinaryRecordType::ACEnd);
                assert_eq!(expected.as_slice(), &[RecordType::from(BinaryRecordType::FRTEnd)]);
            },
            other => panic!("expected UnexpectedRecord, got {:?}", other),
        }
        assert_eq!(stack.top(), Some(RecordContext::FutureRecord));
        stack.resolve(BinaryRecordType::FRTEnd.code()).unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_resolver_without_context() {
        assert_eq!(resolve_record_type(SHARED_CODE, None), None);
        assert_eq!(
            resolve_record_type(SHARED_CODE, Some(RecordContext::AlternateContent)),
            Some(RecordType::AlternateContent(SHARED_CODE))
        );
    }
}
