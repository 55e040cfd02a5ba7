//! Transaction wire format
//!
//! Encodes validated slots into the `param` JSON array of the transaction
//! form and decodes the confirmation payload into typed tickets.

use crate::types::pension::parse_pension_number;
use crate::types::purchase::{MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_GAME};
use crate::types::wire::BuyResult;
use crate::types::{
    EncodedSlot, Game, PensionPurchaseResult, PensionTicket, PurchaseResult, PurchaseSlot,
    SLOT_LABELS, SelectionMode,
};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// `resultCode` of a completed transaction
pub const SUCCESS_CODE: &str = "100";

/// Encode slots, labelling them `A`..`E` by position
pub fn encode_slots(slots: &[PurchaseSlot]) -> Result<Vec<EncodedSlot>> {
    if slots.len() > SLOT_LABELS.len() {
        return Err(Error::internal(format!(
            "cannot label {} slots",
            slots.len()
        )));
    }

    Ok(slots
        .iter()
        .zip(SLOT_LABELS)
        .map(|(slot, label)| EncodedSlot {
            gen_type: slot.mode.to_wire_code().to_string(),
            chosen_numbers: match slot.mode {
                SelectionMode::Auto => None,
                SelectionMode::Manual | SelectionMode::SemiAuto => Some(
                    slot.unique_numbers()
                        .iter()
                        .map(u8::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
            },
            label,
        })
        .collect())
}

/// `param` form field: the encoded slots as a JSON array
pub fn encode_param(slots: &[PurchaseSlot]) -> Result<String> {
    Ok(serde_json::to_string(&encode_slots(slots)?)?)
}

/// `param` for `count` pension tickets; pension numbers are always machine-picked
pub fn encode_pension_param(count: usize) -> Result<String> {
    encode_param(&vec![PurchaseSlot::auto(); count])
}

/// Decode one confirmed game line such as `A|09|12|30|33|35|433`.
///
/// The first character is the slot label and the last one the mode code;
/// the numbers sit in between, `|`-separated.
pub fn parse_game_line(line: &str) -> Result<Game> {
    let invalid = || Error::internal(format!("malformed game line: {:?}", line));

    let slot = line.chars().next().ok_or_else(invalid)?;
    let mode_code = line.chars().last().ok_or_else(invalid)?;
    let mode = SelectionMode::from_wire_code(&mode_code.to_string()).ok_or_else(invalid)?;

    let end = line.len().checked_sub(mode_code.len_utf8()).ok_or_else(invalid)?;
    let middle = line.get(2..end).ok_or_else(invalid)?;
    let numbers = middle
        .split('|')
        .map(|n| n.trim().parse::<u8>())
        .collect::<std::result::Result<BTreeSet<u8>, _>>()
        .map_err(|_| invalid())?;
    if numbers.is_empty() || numbers.len() > NUMBERS_PER_GAME {
        return Err(invalid());
    }
    if numbers.iter().any(|n| !(MIN_NUMBER..=MAX_NUMBER).contains(n)) {
        return Err(invalid());
    }

    Ok(Game {
        slot,
        mode,
        numbers,
    })
}

/// Decode one confirmed pension line such as `A|4123456|0`
pub fn parse_pension_line(line: &str) -> Result<PensionTicket> {
    let invalid = || Error::internal(format!("malformed pension line: {:?}", line));

    let mut parts = line.split('|');
    let mut label = parts.next().ok_or_else(invalid)?.trim().chars();
    let slot = label.next().ok_or_else(invalid)?;
    if label.next().is_some() {
        return Err(invalid());
    }
    let number = parts
        .next()
        .and_then(parse_pension_number)
        .ok_or_else(invalid)?;

    Ok(PensionTicket { slot, number })
}

/// Round, barcode and issue time shared by both products' confirmations
fn receipt_header(result: &BuyResult) -> Result<(u32, String, String)> {
    let round = result
        .buy_round
        .and_then(|r| u32::try_from(r).ok())
        .ok_or_else(|| Error::internal("confirmation has no buyRound"))?;

    let barcode = result
        .barcode_groups()
        .ok_or_else(|| Error::internal("confirmation has an incomplete barcode"))?
        .join(" ");

    let issued_at = [&result.issue_day, &result.week_day, &result.issue_time]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok((round, barcode, issued_at))
}

fn choice_lines(result: &BuyResult) -> Result<&[String]> {
    result
        .arr_game_choice_num
        .as_deref()
        .ok_or_else(|| Error::internal("confirmation has no arrGameChoiceNum"))
}

/// Decode a successful confirmation.
///
/// Reflects exactly the games the server lists, even if fewer than were
/// submitted.
pub fn parse_purchase_result(result: &BuyResult) -> Result<PurchaseResult> {
    let (round, barcode, issued_at) = receipt_header(result)?;
    let games = choice_lines(result)?
        .iter()
        .map(|line| parse_game_line(line))
        .collect::<Result<Vec<_>>>()?;

    Ok(PurchaseResult {
        round,
        barcode,
        issued_at,
        games,
    })
}

/// Decode a successful pension confirmation
pub fn parse_pension_result(result: &BuyResult) -> Result<PensionPurchaseResult> {
    let (round, barcode, issued_at) = receipt_header(result)?;
    let tickets = choice_lines(result)?
        .iter()
        .map(|line| parse_pension_line(line))
        .collect::<Result<Vec<_>>>()?;

    Ok(PensionPurchaseResult {
        round,
        barcode,
        issued_at,
        tickets,
    })
}
