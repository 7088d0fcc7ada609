//! Per-instruction execution tracing

use crate::error::EvmError;
use crate::memory::Memory;
use crate::opcode::OpCode;
use crate::stack::WordStack;
use sable_primitives::{word_to_h256, Address, H256, U256};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Interpreter state just before an instruction runs
#[derive(Debug)]
pub struct Step<'a> {
    /// Program counter
    pub pc: usize,
    /// Instruction
    pub op: OpCode,
    /// Gas left before the instruction was charged
    pub gas: u64,
    /// Gas charged for the instruction
    pub cost: u64,
    /// Frame memory
    pub memory: &'a Memory,
    /// Frame stack
    pub stack: &'a WordStack,
    /// Account the frame runs as
    pub address: Address,
    /// Call depth, 1 for the outermost frame
    pub depth: usize,
    /// Set when the instruction failed to start
    pub error: Option<&'a EvmError>,
}

/// Observer called by the interpreter when debugging is enabled
pub trait Tracer {
    /// Called once per executed instruction
    fn capture_state(&mut self, step: &Step<'_>);

    /// Called when the outermost frame finishes
    fn capture_end(&mut self, output: &[u8], gas_used: u64, error: Option<&EvmError>);
}

/// Options for [`StructLogger`]
#[derive(Clone, Copy, Debug, Default)]
pub struct LogConfig {
    /// Do not record memory
    pub disable_memory: bool,
    /// Do not record the stack
    pub disable_stack: bool,
    /// Do not record storage
    pub disable_storage: bool,
    /// Stop recording after this many steps, 0 for no limit
    pub limit: usize,
}

/// One recorded instruction
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructLog {
    /// Program counter
    pub pc: usize,
    /// Mnemonic
    pub op: String,
    /// Gas left before the instruction
    pub gas: u64,
    /// Gas charged
    pub gas_cost: u64,
    /// Call depth
    pub depth: usize,
    /// Failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stack, bottom first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<U256>>,
    /// Memory in 32-byte hex chunks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<String>>,
    /// Storage slots this frame touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<H256, H256>>,
}

/// Final outcome recorded by [`StructLogger`]
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    /// Return data, hex
    pub output: String,
    /// Gas used by the outermost frame
    pub gas_used: u64,
    /// Failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tracer that records every step as a [`StructLog`]
#[derive(Debug, Default)]
pub struct StructLogger {
    config: LogConfig,
    logs: Vec<StructLog>,
    storage: HashMap<Address, BTreeMap<H256, H256>>,
    result: Option<TraceResult>,
}

impl StructLogger {
    /// New logger
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Recorded steps
    pub fn logs(&self) -> &[StructLog] {
        &self.logs
    }

    /// Outcome, once `capture_end` ran
    pub fn result(&self) -> Option<&TraceResult> {
        self.result.as_ref()
    }
}

impl Tracer for StructLogger {
    fn capture_state(&mut self, step: &Step<'_>) {
        if self.config.limit != 0 && self.logs.len() >= self.config.limit {
            return;
        }

        let storage = if self.config.disable_storage {
            None
        } else {
            let slots = self.storage.entry(step.address).or_default();
            if step.op == OpCode::SSTORE && step.error.is_none() {
                if let (Ok(key), Ok(value)) = (step.stack.peek(0), step.stack.peek(1)) {
                    slots.insert(word_to_h256(key), word_to_h256(value));
                }
            }
            Some(slots.clone())
        };

        let memory = (!self.config.disable_memory).then(|| {
            step.memory
                .data()
                .chunks(32)
                .map(hex::encode)
                .collect::<Vec<_>>()
        });

        self.logs.push(StructLog {
            pc: step.pc,
            op: step.op.to_string(),
            gas: step.gas,
            gas_cost: step.cost,
            depth: step.depth,
            error: step.error.map(|e| e.to_string()),
            stack: (!self.config.disable_stack).then(|| step.stack.data().to_vec()),
            memory,
            storage,
        });
    }

    fn capture_end(&mut self, output: &[u8], gas_used: u64, error: Option<&EvmError>) {
        self.result = Some(TraceResult {
            output: hex::encode(output),
            gas_used,
            error: error.map(|e| e.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step<'a>(op: OpCode, stack: &'a WordStack, memory: &'a Memory) -> Step<'a> {
        Step {
            pc: 0,
            op,
            gas: 100,
            cost: 3,
            memory,
            stack,
            address: Address::zero(),
            depth: 1,
            error: None,
        }
    }

    #[test]
    fn test_records_steps() {
        let mut logger = StructLogger::new(LogConfig::default());
        let stack = WordStack::new();
        let memory = Memory::new();
        logger.capture_state(&step(OpCode::PUSH1, &stack, &memory));
        logger.capture_end(&[0xab], 3, None);

        assert_eq!(logger.logs().len(), 1);
        assert_eq!(logger.logs()[0].op, "PUSH1");
        assert_eq!(logger.result().unwrap().output, "ab");
    }

    #[test]
    fn test_tracks_sstore() {
        let mut logger = StructLogger::new(LogConfig::default());
        let mut stack = WordStack::new();
        stack.push_u64(7).unwrap(); // value
        stack.push_u64(1).unwrap(); // key
        let memory = Memory::new();
        logger.capture_state(&step(OpCode::SSTORE, &stack, &memory));

        let storage = logger.logs()[0].storage.as_ref().unwrap();
        assert_eq!(
            storage.get(&H256::from_low_u64_be(1)),
            Some(&H256::from_low_u64_be(7))
        );
    }

    #[test]
    fn test_limit_and_disabled_fields() {
        let mut logger = StructLogger::new(LogConfig {
            disable_memory: true,
            disable_stack: true,
            disable_storage: true,
            limit: 1,
        });
        let stack = WordStack::new();
        let memory = Memory::new();
        logger.capture_state(&step(OpCode::ADD, &stack, &memory));
        logger.capture_state(&step(OpCode::ADD, &stack, &memory));

        assert_eq!(logger.logs().len(), 1);
        let json = serde_json::to_string(&logger.logs()[0]).unwrap();
        assert!(!json.contains("stack"));
        assert!(json.contains("\"gasCost\":3"));
    }
}
