use crate::{
    codec::EncodedKey,
    error::InternalError,
    model::{index::IndexSpec, schema::RecordSchema},
    plan::{FilteringScore, RangeBound},
    store::KeyRange,
};
use std::{ops::Bound, slice};

/// Lower a filtering score into the byte range a backend scans.
///
/// The identity literals form the prefix. Range literals are encoded as the
/// component right after it, so both bounds are full keys. On a descending
/// range property the natural lower bound is the larger encoded key and the
/// two sides swap.
pub fn key_range(
    schema: &RecordSchema,
    index: &IndexSpec,
    filtering: &FilteringScore,
) -> Result<KeyRange, InternalError> {
    let prefix = index.encode_prefix(schema, &filtering.identity_values)?;

    let start = encode_bound(schema, index, filtering, &prefix, filtering.range_start.as_ref())?;
    let end = encode_bound(schema, index, filtering, &prefix, filtering.range_end.as_ref())?;
    let (lower, upper) = if filtering.should_reverse_order {
        (end, start)
    } else {
        (start, end)
    };

    Ok(KeyRange::prefix(prefix).with_bounds(lower, upper))
}

fn encode_bound(
    schema: &RecordSchema,
    index: &IndexSpec,
    filtering: &FilteringScore,
    prefix: &EncodedKey,
    bound: Option<&RangeBound>,
) -> Result<Bound<EncodedKey>, InternalError> {
    let Some(bound) = bound else {
        return Ok(Bound::Unbounded);
    };

    let mut out = prefix.as_bytes().to_vec();
    index.encode_components_into(
        schema,
        filtering.identity_count,
        slice::from_ref(&bound.value),
        &mut out,
    )?;
    let key = EncodedKey::new(out);

    Ok(if bound.inclusive {
        Bound::Included(key)
    } else {
        Bound::Excluded(key)
    })
}
