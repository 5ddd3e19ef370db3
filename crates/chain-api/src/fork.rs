/// The consensus / fork-config lookup (§1): tells the fees engine whether a
/// given block height has activated the dynamic-fee ("galactica") fork, so
/// `Transaction::effective_priority_fee` can pick the legacy-vs-dynamic gas
/// pricing rule (§4.11 step 3). We specify only the lookup we consume.
pub trait ForkConfig: Send + Sync {
    fn is_galactica_active(&self, block_number: u32) -> bool;
}
