//! Manual adjustment: the configured watering level is left alone

use shared::AdjustmentMethodResult;

pub(super) fn calculate() -> AdjustmentMethodResult {
    AdjustmentMethodResult::unchanged("Manual")
}
