//! Cost curves and power formulas for everything a player can buy.
//!
//! Attribute and pet levels are priced by power sums over the levels being
//! bought: chicken scales with the sum of cubes, wei with the sum of
//! squares. Items and the store are priced by a fixed markup over what the
//! current owner paid.
//!
//! All functions here are pure; the engine applies their results.

use chickenhunt_types::{
    Attribute, Attributes, DepotTier, PetDefinition, StatKind, TierPricing,
};

use crate::error::GameError;

/// Chicken and wei owed for a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cost {
    /// Chicken spent.
    pub chicken: u128,
    /// Wei paid.
    pub ether: u128,
}

/// Price split of an item or store sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markup {
    /// What the buyer pays, `cost + cost / 5`.
    pub price: u128,
    /// What the seller receives, `cost + cost / 10`.
    pub seller_share: u128,
    /// The rest of the price, paid as developer fee.
    pub dev_share: u128,
}

// ---------------------------------------------------------------------------
// Power sums
// ---------------------------------------------------------------------------

/// `1^2 + 2^2 + ... + n^2`.
fn squares_up_to(n: u128) -> Option<u128> {
    n.checked_mul(n.checked_add(1)?)?
        .checked_mul(n.checked_mul(2)?.checked_add(1)?)?
        .checked_div(6)
}

/// `1^3 + 2^3 + ... + n^3`.
fn cubes_up_to(n: u128) -> Option<u128> {
    let triangle = n.checked_mul(n.checked_add(1)?)?.checked_div(2)?;
    triangle.checked_mul(triangle)
}

/// `Σ i^2` for `i` in `from..=to`. Empty when `from > to`.
pub fn sum_of_squares(from: u32, to: u32) -> Result<u128, GameError> {
    range_sum(from, to, squares_up_to)
}

/// `Σ i^3` for `i` in `from..=to`. Empty when `from > to`.
pub fn sum_of_cubes(from: u32, to: u32) -> Result<u128, GameError> {
    range_sum(from, to, cubes_up_to)
}

fn range_sum(from: u32, to: u32, prefix: fn(u128) -> Option<u128>) -> Result<u128, GameError> {
    if from > to {
        return Ok(0);
    }
    let upper = prefix(u128::from(to));
    let lower = prefix(u128::from(from.saturating_sub(1)));
    upper
        .zip(lower)
        .and_then(|(upper, lower)| upper.checked_sub(lower))
        .ok_or(GameError::overflow("power sum"))
}

/// `chicken * Σ i^3` and `ether * Σ i^2` over `from..=to`.
fn curve_cost(chicken: u128, ether: u128, from: u32, to: u32) -> Result<Cost, GameError> {
    Ok(Cost {
        chicken: chicken
            .checked_mul(sum_of_cubes(from, to)?)
            .ok_or(GameError::overflow("chicken cost"))?,
        ether: ether
            .checked_mul(sum_of_squares(from, to)?)
            .ok_or(GameError::overflow("ether cost"))?,
    })
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Cost of raising an attribute from `current` to `to`.
///
/// Levels `current..to` are billed, so going from 1 to 2 costs exactly the
/// tier's base price.
///
/// # Errors
///
/// Returns [`GameError::InvalidRange`] unless `current < to <= tier.max`.
pub fn attribute_cost(tier: &TierPricing, current: u32, to: u32) -> Result<Cost, GameError> {
    if to <= current {
        return Err(GameError::invalid_range(format!(
            "target level {to} must exceed current level {current}"
        )));
    }
    if to > tier.max {
        return Err(GameError::invalid_range(format!(
            "target level {to} exceeds max {}",
            tier.max
        )));
    }
    curve_cost(tier.chicken, tier.ether, current, to.saturating_sub(1))
}

/// Power contributed by attributes to hunting and offense:
/// `str^2 * (10 + 2 * (dex - 1))`.
pub fn hunting_attribute_power(attributes: &Attributes) -> Result<u64, GameError> {
    attribute_power(attributes.strength, attributes.dexterity, 0)
}

/// Power contributed by attributes to defense:
/// `con^2 * (10 + 2 * (res - 1)) + 100`.
pub fn defense_attribute_power(attributes: &Attributes) -> Result<u64, GameError> {
    attribute_power(attributes.constitution, attributes.resistance, 100)
}

fn attribute_power(quadratic: u32, linear: u32, flat: u64) -> Result<u64, GameError> {
    let q = u64::from(quadratic);
    let l = u64::from(linear).saturating_sub(1);
    q.checked_mul(q)
        .and_then(|square| {
            l.checked_mul(2)
                .and_then(|bonus| bonus.checked_add(10))
                .and_then(|factor| square.checked_mul(factor))
        })
        .and_then(|power| power.checked_add(flat))
        .ok_or(GameError::overflow("attribute power"))
}

/// The stats whose power depends on an attribute.
pub const fn affected_stats(attribute: Attribute) -> &'static [StatKind] {
    match attribute {
        Attribute::Strength | Attribute::Dexterity => &[StatKind::Hunting, StatKind::Offense],
        Attribute::Constitution | Attribute::Resistance => &[StatKind::Defense],
    }
}

/// Attribute power for a stat.
pub fn stat_attribute_power(attributes: &Attributes, kind: StatKind) -> Result<u64, GameError> {
    match kind {
        StatKind::Hunting | StatKind::Offense => hunting_attribute_power(attributes),
        StatKind::Defense => defense_attribute_power(attributes),
    }
}

// ---------------------------------------------------------------------------
// Pets and depots
// ---------------------------------------------------------------------------

/// Cost of buying `amount` levels of `pet` on top of `level`.
///
/// Levels `level + 1 ..= level + amount` are billed, so the first unit
/// costs exactly the template price.
///
/// # Errors
///
/// Returns [`GameError::InvalidRange`] if `amount` is zero or the new level
/// would exceed the pet's max.
pub fn pet_cost(pet: &PetDefinition, level: u32, amount: u32) -> Result<Cost, GameError> {
    let target = checked_level(level, amount, pet.max, "pet")?;
    curve_cost(pet.chicken, pet.ether, level.saturating_add(1), target)
}

/// Wei cost of buying `amount` depots on top of `depots`.
///
/// # Errors
///
/// Returns [`GameError::InvalidRange`] if `amount` is zero or the new count
/// would exceed the depot max.
pub fn depot_cost(tier: &DepotTier, depots: u32, amount: u32) -> Result<u128, GameError> {
    checked_level(depots, amount, tier.max, "depot")?;
    tier.price
        .checked_mul(u128::from(amount))
        .ok_or(GameError::overflow("depot cost"))
}

/// `level + amount`, checked against `max`.
pub fn checked_level(level: u32, amount: u32, max: u32, what: &str) -> Result<u32, GameError> {
    if amount == 0 {
        return Err(GameError::invalid_range(format!("{what} amount must be positive")));
    }
    let target = level
        .checked_add(amount)
        .ok_or_else(|| GameError::invalid_range(format!("{what} level overflow")))?;
    if target > max {
        return Err(GameError::invalid_range(format!(
            "{what} level {target} exceeds max {max}"
        )));
    }
    Ok(target)
}

/// Power added to `kind` by buying `amount` levels of `pet`.
pub fn pet_power(pet: &PetDefinition, kind: StatKind, amount: u32) -> Result<u64, GameError> {
    pet.power(kind)
        .checked_mul(u64::from(amount))
        .ok_or(GameError::overflow("pet power"))
}

// ---------------------------------------------------------------------------
// Items and store
// ---------------------------------------------------------------------------

/// Resale prices over what the current owner paid.
pub fn markup(cost: u128) -> Result<Markup, GameError> {
    let price = cost
        .checked_add(cost / 5)
        .ok_or(GameError::overflow("sale price"))?;
    let seller_share = cost
        .checked_add(cost / 10)
        .ok_or(GameError::overflow("seller share"))?;
    Ok(Markup {
        price,
        seller_share,
        dev_share: price.saturating_sub(seller_share),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn naive(from: u32, to: u32, exp: u32) -> u128 {
        (from..=to).map(|i| u128::from(i).pow(exp)).sum()
    }

    #[test]
    fn power_sums_match_naive_loops() {
        for (from, to) in [(1, 1), (1, 9), (3, 7), (50, 98), (10, 5)] {
            assert_eq!(sum_of_squares(from, to).unwrap(), naive(from, to, 2));
            assert_eq!(sum_of_cubes(from, to).unwrap(), naive(from, to, 3));
        }
        assert_eq!(sum_of_cubes(0, 3).unwrap(), 36);
    }

    #[test]
    fn first_attribute_level_costs_base_price() {
        let tier = chickenhunt_types::AttributeTiers::default().quadratic;
        let cost = attribute_cost(&tier, 1, 2).unwrap();
        assert_eq!(cost.chicken, 100);
        assert_eq!(cost.ether, 10_000_000_000_000);
    }

    #[test]
    fn multi_level_attribute_cost() {
        let tier = chickenhunt_types::AttributeTiers::default().linear;
        // levels 2, 3 and 4 are billed going from 2 to 5
        let cost = attribute_cost(&tier, 2, 5).unwrap();
        assert_eq!(cost.chicken, 100_000 * (8 + 27 + 64));
        assert_eq!(cost.ether, 1_000_000_000_000_000 * (4 + 9 + 16));
    }

    #[test]
    fn attribute_range_is_checked() {
        let tier = chickenhunt_types::AttributeTiers::default().linear;
        assert!(matches!(
            attribute_cost(&tier, 3, 3),
            Err(GameError::InvalidRange { .. })
        ));
        assert!(matches!(
            attribute_cost(&tier, 3, 10),
            Err(GameError::InvalidRange { .. })
        ));
        assert!(attribute_cost(&tier, 8, 9).is_ok());
    }

    #[test]
    fn attribute_power_formulas() {
        let mut attributes = Attributes::default();
        assert_eq!(hunting_attribute_power(&attributes).unwrap(), 10);
        assert_eq!(defense_attribute_power(&attributes).unwrap(), 110);

        attributes.strength = 3;
        attributes.dexterity = 4;
        attributes.constitution = 2;
        attributes.resistance = 2;
        assert_eq!(hunting_attribute_power(&attributes).unwrap(), 9 * 16);
        assert_eq!(defense_attribute_power(&attributes).unwrap(), 4 * 12 + 100);
    }

    #[test]
    fn single_pet_costs_template_price() {
        let pet = PetDefinition {
            hunting_power: 1_000,
            offense_power: 0,
            defense_power: 0,
            chicken: 100_000,
            ether: 10_000_000_000_000_000,
            max: 9,
        };
        let cost = pet_cost(&pet, 0, 1).unwrap();
        assert_eq!(cost.chicken, 100_000);
        assert_eq!(cost.ether, 10_000_000_000_000_000);

        let cost = pet_cost(&pet, 1, 2).unwrap();
        assert_eq!(cost.chicken, 100_000 * (8 + 27));
        assert_eq!(cost.ether, 10_000_000_000_000_000 * (4 + 9));

        assert!(pet_cost(&pet, 0, 0).is_err());
        assert!(pet_cost(&pet, 5, 5).is_err());
        assert!(pet_cost(&pet, 4, 5).is_ok());
        assert_eq!(pet_power(&pet, StatKind::Hunting, 3).unwrap(), 3_000);
        assert_eq!(pet_power(&pet, StatKind::Defense, 3).unwrap(), 0);
    }

    #[test]
    fn depot_cost_is_linear() {
        let tier = DepotTier {
            price: 50,
            max: 9,
        };
        assert_eq!(depot_cost(&tier, 1, 3).unwrap(), 150);
        assert!(depot_cost(&tier, 1, 0).is_err());
        assert!(depot_cost(&tier, 1, 9).is_err());
        assert!(depot_cost(&tier, 1, 8).is_ok());
    }

    #[test]
    fn markup_splits_price() {
        let m = markup(10_000_000_000_000_000).unwrap();
        assert_eq!(m.price, 12_000_000_000_000_000);
        assert_eq!(m.seller_share, 11_000_000_000_000_000);
        assert_eq!(m.dev_share, 1_000_000_000_000_000);
    }
}
