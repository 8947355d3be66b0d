use super::error::ChannelCountError;

/// Sum the charge collected on each readout channel.
///
/// charges[i] was collected by channel ids[i]; the result is indexed by channel id.
pub fn sum_channel_charges(
    charges: &[f64],
    ids: &[i64],
    n_channels: usize,
) -> Result<Vec<f64>, ChannelCountError> {
    if charges.len() != ids.len() {
        return Err(ChannelCountError::MismatchedLengths(charges.len(), ids.len()));
    }
    let mut sorted = vec![0.0; n_channels];
    for (charge, id) in charges.iter().zip(ids.iter()) {
        match usize::try_from(*id).ok().filter(|idx| *idx < n_channels) {
            Some(idx) => sorted[idx] += charge,
            None => return Err(ChannelCountError::BadChannel(*id, n_channels)),
        }
    }
    Ok(sorted)
}
