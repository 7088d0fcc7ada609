//! Call and create entry points.
//!
//! [`Evm`] owns everything shared by the frames of one message: the state,
//! block and transaction context, fork rules and the tracer. Each CALL or
//! CREATE runs a fresh [`Interpreter`] inside a state snapshot which is
//! reverted if the frame fails.

use crate::config::VmConfig;
use crate::context::{BlockContext, CallContext, TxContext};
use crate::error::EvmError;
use crate::gas::cost;
use crate::interpreter::Interpreter;
use crate::jump_table::{JumpTable, Operation};
use crate::opcode::OpCode;
use crate::precompiles::precompile;
use crate::rules::Rules;
use crate::state::StateAccess;
use crate::tracer::{Step, Tracer};
use bytes::Bytes;
use sable_crypto::{create2_address, create_address, keccak256, KECCAK_EMPTY};
use sable_primitives::{Address, H256, U256};
use tracing::{debug, warn};

/// Outcome of a call or create as seen by the caller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallResult {
    /// Return data, or the revert reason
    pub output: Vec<u8>,
    /// Unused gas handed back
    pub gas_left: u64,
    /// `None` on success
    pub error: Option<EvmError>,
    /// Address of the new contract, creates only
    pub address: Option<Address>,
}

impl CallResult {
    fn failed(error: EvmError, gas_left: u64) -> Self {
        Self {
            error: Some(error),
            gas_left,
            ..Default::default()
        }
    }

    /// Whether the call completed without error
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Execution environment for one message and all of its nested frames
pub struct Evm<'a> {
    /// World state
    pub state: &'a mut dyn StateAccess,
    /// Block being built or replayed
    pub block: BlockContext,
    /// Transaction level values
    pub tx: TxContext,
    rules: Rules,
    config: VmConfig,
    table: JumpTable,
    tracer: Option<&'a mut dyn Tracer>,
    depth: usize,
    read_only: bool,
}

impl<'a> Evm<'a> {
    /// New environment with the instruction set selected by `rules`
    pub fn new(
        state: &'a mut dyn StateAccess,
        block: BlockContext,
        tx: TxContext,
        rules: Rules,
        config: VmConfig,
    ) -> Self {
        Self {
            state,
            block,
            tx,
            table: JumpTable::new(&rules),
            rules,
            config,
            tracer: None,
            depth: 0,
            read_only: false,
        }
    }

    /// Attach a tracer; it only receives steps when `config.debug` is set
    pub fn with_tracer(mut self, tracer: &'a mut dyn Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Fork rules in force
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Interpreter switches
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Number of frames currently executing
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn operation(&self, op: OpCode) -> &Operation {
        &self.table[op]
    }

    pub(crate) fn capture_state(
        &mut self,
        interp: &Interpreter,
        op: OpCode,
        gas: u64,
        cost: u64,
        error: Option<&EvmError>,
    ) {
        if !self.config.debug {
            return;
        }
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.capture_state(&Step {
                pc: interp.pc,
                op,
                gas,
                cost,
                memory: &interp.memory,
                stack: &interp.stack,
                address: interp.context.address,
                depth: self.depth,
                error,
            });
        }
    }

    fn capture_end(&mut self, gas: u64, result: &CallResult) {
        if self.depth != 0 || !self.config.debug {
            return;
        }
        if let Some(tracer) = self.tracer.as_mut() {
            let gas_used = gas.saturating_sub(result.gas_left);
            tracer.capture_end(&result.output, gas_used, result.error.as_ref());
        }
    }

    fn revert(&mut self, snapshot: usize) {
        if let Err(err) = self.state.revert_to_snapshot(snapshot) {
            warn!(snapshot, %err, "Failed to revert state snapshot");
        }
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) {
        self.state.sub_balance(from, value);
        self.state.add_balance(to, value);
    }

    /// Run `context` as a frame: a precompile if the code address names
    /// one, otherwise the interpreter.
    fn run_frame(&mut self, mut context: CallContext) -> CallResult {
        if let Some(contract) = precompile(&context.code_address) {
            let required = contract.required_gas(&context.input);
            if !context.use_gas(required) {
                return CallResult::failed(EvmError::OutOfGas, 0);
            }
            return match contract.run(&context.input) {
                Ok(output) => CallResult {
                    output,
                    gas_left: context.gas,
                    ..Default::default()
                },
                Err(err) => CallResult::failed(err, 0),
            };
        }

        self.depth += 1;
        debug!(
            depth = self.depth,
            address = ?context.address,
            gas = context.gas,
            "Entering frame"
        );
        let outcome = Interpreter::new(context, self.read_only).run(self);
        debug!(
            depth = self.depth,
            status = ?outcome.status,
            gas_left = outcome.gas_left,
            "Leaving frame"
        );
        self.depth -= 1;

        CallResult {
            output: outcome.output,
            gas_left: outcome.gas_left,
            error: outcome.error,
            address: None,
        }
    }

    /// Common prologue: recursion switch and depth limit
    fn enter(&self, gas: u64) -> Option<CallResult> {
        if self.config.no_recursion && self.depth > 0 {
            return Some(CallResult {
                gas_left: gas,
                ..Default::default()
            });
        }
        if self.depth > cost::CALL_CREATE_DEPTH {
            return Some(CallResult::failed(EvmError::CallDepthExceeded, gas));
        }
        None
    }

    fn settle(&mut self, snapshot: usize, result: &mut CallResult) {
        if let Some(err) = &result.error {
            debug!(depth = self.depth, %err, "Reverting frame");
            self.revert(snapshot);
            if err.consumes_all_gas() {
                result.gas_left = 0;
            }
        }
    }

    /// Message call to `to`, transferring `value` from `caller`
    pub fn call(
        &mut self,
        caller: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if let Some(result) = self.enter(gas) {
            return result;
        }
        if self.state.get_balance(&caller) < value {
            return CallResult::failed(EvmError::InsufficientBalance, gas);
        }

        let snapshot = self.state.snapshot();
        if !self.state.exists(&to) {
            self.state.create_account(to);
        }
        self.transfer(caller, to, value);

        let code = self.state.get_code(&to);
        let context = CallContext::new(caller, to, to, code, input, value, gas);
        let mut result = self.run_frame(context);
        self.settle(snapshot, &mut result);
        self.capture_end(gas, &result);
        result
    }

    /// Run `context` directly, with no value transfer or account creation.
    /// VM test fixtures are executed this way.
    pub fn execute(&mut self, context: CallContext) -> CallResult {
        let gas = context.gas;
        let snapshot = self.state.snapshot();
        let mut result = self.run_frame(context);
        self.settle(snapshot, &mut result);
        self.capture_end(gas, &result);
        result
    }

    /// Run the code of `to` against the storage of `caller`
    pub fn call_code(
        &mut self,
        caller: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if let Some(result) = self.enter(gas) {
            return result;
        }
        if self.state.get_balance(&caller) < value {
            return CallResult::failed(EvmError::InsufficientBalance, gas);
        }

        let snapshot = self.state.snapshot();
        let code = self.state.get_code(&to);
        let context = CallContext::new(caller, caller, to, code, input, value, gas);
        let mut result = self.run_frame(context);
        self.settle(snapshot, &mut result);
        result
    }

    /// Run the code of `to` in the frame described by `parent`, keeping its
    /// caller and value
    pub fn delegate_call(
        &mut self,
        parent: &CallContext,
        to: Address,
        input: Bytes,
        gas: u64,
    ) -> CallResult {
        if let Some(result) = self.enter(gas) {
            return result;
        }

        let snapshot = self.state.snapshot();
        let code = self.state.get_code(&to);
        let context = CallContext::new(
            parent.caller,
            parent.address,
            to,
            code,
            input,
            parent.value,
            gas,
        );
        let mut result = self.run_frame(context);
        self.settle(snapshot, &mut result);
        result
    }

    /// Call `to` with every state modification forbidden for the duration
    pub fn static_call(&mut self, caller: Address, to: Address, input: Bytes, gas: u64) -> CallResult {
        if let Some(result) = self.enter(gas) {
            return result;
        }

        let was_read_only = self.read_only;
        self.read_only = true;

        let snapshot = self.state.snapshot();
        // a zero transfer still touches the callee
        self.state.add_balance(to, U256::zero());

        let code = self.state.get_code(&to);
        let context = CallContext::new(caller, to, to, code, input, U256::zero(), gas);
        let mut result = self.run_frame(context);
        self.settle(snapshot, &mut result);

        self.read_only = was_read_only;
        result
    }

    /// Deploy `code` at the address derived from the caller's nonce
    pub fn create(&mut self, caller: Address, code: Bytes, gas: u64, value: U256) -> CallResult {
        let nonce = self.state.get_nonce(&caller);
        let address = create_address(&caller, nonce);
        self.create_at(caller, address, code, gas, value)
    }

    /// Deploy `code` at the address derived from `salt` and the code hash
    pub fn create2(
        &mut self,
        caller: Address,
        code: Bytes,
        gas: u64,
        value: U256,
        salt: H256,
    ) -> CallResult {
        let address = create2_address(&caller, &salt, &keccak256(&code));
        self.create_at(caller, address, code, gas, value)
    }

    fn create_at(
        &mut self,
        caller: Address,
        address: Address,
        code: Bytes,
        gas: u64,
        value: U256,
    ) -> CallResult {
        if self.depth > cost::CALL_CREATE_DEPTH {
            return CallResult::failed(EvmError::CallDepthExceeded, gas);
        }
        if self.state.get_balance(&caller) < value {
            return CallResult::failed(EvmError::InsufficientBalance, gas);
        }
        let nonce = self.state.get_nonce(&caller);
        self.state.set_nonce(caller, nonce + 1);

        let code_hash = self.state.get_code_hash(&address);
        if self.state.get_nonce(&address) != self.state.starting_nonce()
            || (!code_hash.is_zero() && code_hash != KECCAK_EMPTY)
        {
            return CallResult::failed(EvmError::ContractAddressCollision, 0);
        }

        let snapshot = self.state.snapshot();
        self.state.create_account(address);
        self.transfer(caller, address, value);

        if self.config.no_recursion && self.depth > 0 {
            return CallResult {
                gas_left: gas,
                address: Some(address),
                ..Default::default()
            };
        }

        let context = CallContext::new(caller, address, address, code, Bytes::new(), value, gas);
        let mut result = self.run_frame(context);
        result.address = Some(address);

        let too_large = self.rules.byzantium && result.output.len() > cost::MAX_CODE_SIZE;
        if result.error.is_none() && !too_large {
            let deposit = result.output.len() as u64 * cost::CREATE_DATA;
            if result.gas_left >= deposit {
                result.gas_left -= deposit;
                self.state.set_code(address, Bytes::from(result.output.clone()));
            } else {
                result.error = Some(EvmError::CodeStoreOutOfGas);
            }
        }

        let keep_account =
            result.error == Some(EvmError::CodeStoreOutOfGas) && !self.rules.homestead;
        if too_large || (result.error.is_some() && !keep_account) {
            debug!(depth = self.depth, ?address, error = ?result.error, "Create failed");
            self.revert(snapshot);
            if result.error != Some(EvmError::Revert) {
                result.gas_left = 0;
            }
        }
        if too_large && result.error.is_none() {
            result.error = Some(EvmError::MaxCodeSizeExceeded);
        }
        self.capture_end(gas, &result);
        result
    }
}
