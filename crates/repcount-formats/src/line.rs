//! Shared line-level helpers for the `.gr` / `.td` readers.

use nom::{
    character::complete::{digit1, multispace0, multispace1},
    combinator::{all_consuming, map_res},
    multi::separated_list1,
    sequence::delimited,
    IResult,
};

fn uint(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

fn uint_list(input: &str) -> IResult<&str, Vec<u32>> {
    delimited(multispace0, separated_list1(multispace1, uint), multispace0)(input)
}

/// Parse a whitespace-separated list of unsigned integers (at least one).
pub(crate) fn parse_uint_list(text: &str) -> Result<Vec<u32>, String> {
    match all_consuming(uint_list)(text) {
        Ok((_, values)) => Ok(values),
        Err(_) => Err(describe_bad_token(text)),
    }
}

fn describe_bad_token(text: &str) -> String {
    match text
        .split_whitespace()
        .find(|tok| tok.parse::<u32>().is_err())
    {
        Some(tok) => format!("invalid vertex id `{tok}`"),
        None => "expected at least one vertex id".to_string(),
    }
}

/// Convert 1-based vertex ids to 0-based ones, rejecting `0`.
pub(crate) fn to_zero_based(ids: &[u32]) -> Result<Vec<u32>, String> {
    ids.iter()
        .map(|&id| {
            id.checked_sub(1)
                .ok_or_else(|| "vertex ids are 1-based; found `0`".to_string())
        })
        .collect()
}

/// Sort and de-duplicate in place; returns the vector for chaining.
pub(crate) fn normalize(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
