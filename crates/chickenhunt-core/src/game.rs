//! The `ChickenHunt` engine: one sequential state machine owning the whole
//! economy.
//!
//! Every mutating operation takes `&mut self`, reads the time once from the
//! injected [`Clock`], validates everything it needs, and only then writes.
//! A call that returns an error leaves no trace. Each successful transition
//! appends one or more [`EventRecord`]s to the event log, which observers
//! drain with [`ChickenHunt::drain_events`].
//!
//! Administrative operations live in [`crate::committee`].

use std::collections::BTreeMap;

use tracing::{debug, info};

use chickenhunt_ledger::solvency::verify_solvency;
use chickenhunt_ledger::{Redemption, SolvencyResult, SolvencySnapshot, StockLedger, Wallet};
use chickenhunt_types::{
    AltarRecord, AltarRecordId, Attribute, AttributeTiers, DepotTier, Distribution, EventId,
    EventRecord, GameEvent, HunterView, Item, ItemId, PetDefinition, PetId, Player,
    PlayerDetails, PlayerId, StatKind, StoreSlot, TradeBook,
};

use crate::accrual;
use crate::altar::AltarPool;
use crate::arena::{self, CombatOutcome, Entropy, SeededEntropy};
use crate::clock::{self, Clock, SystemClock};
use crate::committee::Committee;
use crate::config::GameConfig;
use crate::distribution::{self, PaymentSplit};
use crate::error::GameError;
use crate::progression;

/// A payment that passed every check and is ready to be applied.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PaymentPlan {
    split: PaymentSplit,
    altar_fund: u128,
    store_balance: u128,
    dev_fee: u128,
    total_received: u128,
}

/// The game engine.
#[derive(Debug)]
pub struct ChickenHunt<C = SystemClock, E = SeededEntropy> {
    pub(crate) clock: C,
    pub(crate) entropy: E,
    /// Unix second the game started; altar day 0 begins here.
    pub(crate) genesis: u64,
    pub(crate) day_length: u64,
    pub(crate) committee: Committee,
    pub(crate) distribution: Distribution,
    pub(crate) cooldown_time: u64,
    pub(crate) tiers: AttributeTiers,
    pub(crate) depot: DepotTier,
    pub(crate) pets: Vec<PetDefinition>,
    pub(crate) items: Vec<Item>,
    pub(crate) store: StoreSlot,
    pub(crate) players: BTreeMap<PlayerId, Player>,
    /// Chicken held by accounts that never joined. It does not accrue.
    pub(crate) holdings: BTreeMap<PlayerId, u128>,
    pub(crate) stock: StockLedger,
    pub(crate) wallet: Wallet,
    pub(crate) altar: AltarPool,
    /// Chicken folded into saved balances through the resource facade.
    pub(crate) total_chicken: u128,
    /// Wei ever sent into the game.
    pub(crate) total_received: u128,
    pub(crate) events: Vec<EventRecord>,
}

impl<C: Clock, E: Entropy> ChickenHunt<C, E> {
    /// Start a game at the clock's current time.
    ///
    /// `admin` becomes the committee and the developer. It is joined
    /// immediately and owns the store and every configured item.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigurationInvalid`] if `config` fails
    /// validation.
    pub fn new(config: GameConfig, admin: PlayerId, clock: C, entropy: E) -> Result<Self, GameError> {
        config.validate()?;
        let genesis = clock.now();

        let mut admin_player = Player::new(admin, genesis);
        let mut items = Vec::with_capacity(config.items.len());
        for item in &config.items {
            let owned = Item {
                owner: admin,
                hunting_bonus: item.hunting_bonus,
                offense_bonus: item.offense_bonus,
                defense_bonus: item.defense_bonus,
                cost: item.cost,
            };
            apply_item_bonus(&mut admin_player, &owned, true)?;
            items.push(owned);
        }

        let mut game = Self {
            clock,
            entropy,
            genesis,
            day_length: config.altar.day_length,
            committee: Committee::new(admin),
            distribution: config.distribution,
            cooldown_time: config.arena.cooldown_time,
            tiers: config.attributes,
            depot: config.depot,
            pets: config.pets,
            items,
            store: StoreSlot {
                owner: admin,
                cost: config.store.cost,
                balance: 0,
            },
            players: BTreeMap::new(),
            holdings: BTreeMap::new(),
            stock: StockLedger::new(),
            wallet: Wallet::new(),
            altar: AltarPool::new(config.altar.allocation_percent),
            total_chicken: 0,
            total_received: 0,
            events: Vec::new(),
        };
        game.players.insert(admin, admin_player);
        game.emit(GameEvent::Join { player: admin });
        info!(%admin, genesis, "Game started");
        Ok(game)
    }

    // -----------------------------------------------------------------------
    // Time and events
    // -----------------------------------------------------------------------

    /// The engine's clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock, for driving time in tests and replays.
    pub const fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Current unix second.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Unix second the game started.
    pub const fn genesis(&self) -> u64 {
        self.genesis
    }

    /// Current altar day index.
    pub fn today(&self) -> Result<AltarRecordId, GameError> {
        Ok(clock::day_index(self.now(), self.genesis, self.day_length)?)
    }

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Take every pending event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        let at = self.now();
        self.events.push(EventRecord {
            id: EventId::new(),
            at,
            event,
        });
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    /// Register a new player with launch stats. Chicken the account received
    /// before joining becomes its saved balance.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyJoined`] if the account exists.
    pub fn join(&mut self, player: PlayerId) -> Result<(), GameError> {
        if self.players.contains_key(&player) {
            return Err(GameError::AlreadyJoined { player });
        }
        let now = self.now();
        let mut record = Player::new(player, now);
        if let Some(held) = self.holdings.remove(&player) {
            record.saved_chicken = held;
        }
        let saved = record.saved_chicken;
        self.players.insert(player, record);
        self.emit(GameEvent::Join { player });
        info!(%player, saved, "Player joined");
        Ok(())
    }

    /// Whether the account has joined.
    pub fn is_player(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    /// Number of joined players, the committee included.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub(crate) fn player(&self, player: PlayerId) -> Result<&Player, GameError> {
        self.players
            .get(&player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(&player)
            .ok_or(GameError::UnknownPlayer { player })
    }

    /// Chicken balance at the current time. An account that never joined
    /// only has what was transferred to it.
    pub fn chicken_of(&self, player: PlayerId) -> Result<u128, GameError> {
        self.players.get(&player).map_or_else(
            || Ok(self.holdings.get(&player).copied().unwrap_or_default()),
            |record| accrual::chicken_of(record, self.now()),
        )
    }

    /// Pending accrual not yet folded; zero for accounts that never joined.
    fn pending_chicken(&self, player: PlayerId, now: u64) -> Result<u128, GameError> {
        self.players
            .get(&player)
            .map_or(Ok(0), |record| accrual::pending(record, now))
    }

    /// Full player record with balances.
    pub fn details_of(&self, player: PlayerId) -> Result<PlayerDetails, GameError> {
        let record = self.player(player)?;
        Ok(PlayerDetails {
            player: record.clone(),
            chicken: accrual::chicken_of(record, self.now())?,
            wallet: self.wallet.balance_of(player),
            shares: self.stock.balance_of(player),
            dividends: self.stock.dividends_of(player)?,
        })
    }

    /// Attribute levels; all zero for unknown accounts.
    pub fn hunter_of(&self, player: PlayerId) -> HunterView {
        self.players
            .get(&player)
            .map_or_else(HunterView::default, |record| HunterView::from(record.attributes))
    }

    // -----------------------------------------------------------------------
    // Resource facade
    // -----------------------------------------------------------------------

    /// Chicken folded into saved balances so far.
    pub const fn total_chicken(&self) -> u128 {
        self.total_chicken
    }

    /// Fold a player's pending accrual into their saved balance. Returns the
    /// new balance.
    ///
    /// For an account that never joined nothing accrues, so this only
    /// reports what it holds.
    pub fn save_chicken_of(&mut self, player: PlayerId) -> Result<u128, GameError> {
        let now = self.now();
        if !self.is_player(player) {
            return self.chicken_of(player);
        }
        let folded = self.pending_chicken(player, now)?;
        let total = self
            .total_chicken
            .checked_add(folded)
            .ok_or(GameError::overflow("total chicken"))?;

        let record = self.player_mut(player)?;
        accrual::settle(record, now)?;
        let saved = record.saved_chicken;
        self.total_chicken = total;
        Ok(saved)
    }

    /// Move settled chicken between two accounts. Either side may be an
    /// account that never joined.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientResource`] if `from` is short.
    pub fn transfer_chicken(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        amount: u128,
    ) -> Result<(), GameError> {
        let now = self.now();
        let available = self.chicken_of(from)?;
        if available < amount {
            return Err(GameError::InsufficientResource {
                player: from,
                required: amount,
                available,
            });
        }
        let mut folded = self.pending_chicken(from, now)?;
        if from != to {
            self.chicken_of(to)?
                .checked_add(amount)
                .ok_or(GameError::overflow("transfer chicken"))?;
            folded = folded
                .checked_add(self.pending_chicken(to, now)?)
                .ok_or(GameError::overflow("total chicken"))?;
        }
        let total = self
            .total_chicken
            .checked_add(folded)
            .ok_or(GameError::overflow("total chicken"))?;

        if from != to {
            self.debit_chicken(from, amount, now)?;
            self.credit_chicken(to, amount, now)?;
        } else if let Some(record) = self.players.get_mut(&from) {
            accrual::settle(record, now)?;
        }
        self.total_chicken = total;
        self.emit(GameEvent::ResourceTransfer {
            from,
            to,
            value: amount,
        });
        debug!(%from, %to, amount, "Chicken transferred");
        Ok(())
    }

    fn debit_chicken(&mut self, account: PlayerId, amount: u128, now: u64) -> Result<(), GameError> {
        if let Some(record) = self.players.get_mut(&account) {
            accrual::spend(record, amount, now)?;
            return Ok(());
        }
        let held = self.holdings.get(&account).copied().unwrap_or_default();
        let left = held
            .checked_sub(amount)
            .ok_or(GameError::InsufficientResource {
                player: account,
                required: amount,
                available: held,
            })?;
        if left == 0 {
            self.holdings.remove(&account);
        } else {
            self.holdings.insert(account, left);
        }
        Ok(())
    }

    fn credit_chicken(&mut self, account: PlayerId, amount: u128, now: u64) -> Result<(), GameError> {
        if let Some(record) = self.players.get_mut(&account) {
            accrual::earn(record, amount, now)?;
            return Ok(());
        }
        if amount == 0 {
            return Ok(());
        }
        let held = self.holdings.entry(account).or_default();
        *held = held
            .checked_add(amount)
            .ok_or(GameError::overflow("transfer chicken"))?;
        Ok(())
    }

    /// Spend chicken on a purchase, shrinking the folded supply.
    fn burn_chicken(&mut self, player: PlayerId, amount: u128, now: u64) -> Result<(), GameError> {
        accrual::spend(self.player_mut(player)?, amount, now)?;
        self.total_chicken = self.total_chicken.saturating_sub(amount);
        Ok(())
    }


    // -----------------------------------------------------------------------
    // Currency
    // -----------------------------------------------------------------------

    /// Withdrawable wei of any account.
    pub fn wallet_balance(&self, player: PlayerId) -> u128 {
        self.wallet.balance_of(player)
    }

    /// Drain an account's wallet. Returns the wei paid out.
    pub fn withdraw(&mut self, player: PlayerId) -> Result<u128, GameError> {
        let value = self.wallet.withdraw(player)?;
        if value > 0 {
            self.emit(GameEvent::CurrencyWithdrawal { player, value });
            info!(%player, value, "Currency withdrawn");
        }
        Ok(value)
    }

    /// Wei ever sent into the game.
    pub const fn total_received(&self) -> u128 {
        self.total_received
    }

    /// Check a distributed payment of `sent` toward `required`.
    pub(crate) fn plan_payment(
        &self,
        payer: PlayerId,
        required: u128,
        sent: u128,
    ) -> Result<PaymentPlan, GameError> {
        let split = distribution::split_payment(self.distribution, required, sent)?;
        self.stock.check_give_shares(payer, split.dividends)?;
        self.wallet.ensure_credit(payer, split.refund)?;
        Ok(PaymentPlan {
            split,
            altar_fund: self
                .altar
                .fund()
                .checked_add(split.altar)
                .ok_or(GameError::overflow("altar fund"))?,
            store_balance: self
                .store
                .balance
                .checked_add(split.store)
                .ok_or(GameError::overflow("store balance"))?,
            dev_fee: self
                .committee
                .dev_fee
                .checked_add(split.dev)
                .ok_or(GameError::overflow("dev fee"))?,
            total_received: self
                .total_received
                .checked_add(sent)
                .ok_or(GameError::overflow("total received"))?,
        })
    }

    /// Apply a planned payment: mint and deposit the dividend cut, credit
    /// the refund, and grow the altar fund, store balance and developer fee.
    pub(crate) fn commit_payment(
        &mut self,
        payer: PlayerId,
        plan: PaymentPlan,
    ) -> Result<(), GameError> {
        let split = plan.split;
        self.stock.give_shares(payer, split.dividends)?;
        self.wallet.credit(payer, split.refund)?;
        self.altar.add_to_fund(split.altar)?;
        self.store.balance = plan.store_balance;
        self.committee.dev_fee = plan.dev_fee;
        self.total_received = plan.total_received;
        if split.dividends > 0 {
            self.emit(GameEvent::StockTransfer {
                from: None,
                to: Some(payer),
                value: split.dividends,
            });
        }
        debug!(
            %payer,
            dividends = split.dividends,
            altar = split.altar,
            store = split.store,
            dev = split.dev,
            refund = split.refund,
            altar_fund = plan.altar_fund,
            "Payment distributed"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stock facade
    // -----------------------------------------------------------------------

    /// The stock ledger.
    pub const fn stock(&self) -> &StockLedger {
        &self.stock
    }

    /// Shares held.
    pub fn shares_of(&self, player: PlayerId) -> u128 {
        self.stock.balance_of(player)
    }

    /// Remaining share allowance.
    pub fn allowance(&self, owner: PlayerId, spender: PlayerId) -> u128 {
        self.stock.allowance(owner, spender)
    }

    /// Unredeemed dividends.
    pub fn dividends_of(&self, player: PlayerId) -> Result<u128, GameError> {
        Ok(self.stock.dividends_of(player)?)
    }

    /// Move shares between holders.
    pub fn transfer_shares(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        amount: u128,
    ) -> Result<(), GameError> {
        self.stock.transfer(from, to, amount)?;
        self.emit(GameEvent::StockTransfer {
            from: Some(from),
            to: Some(to),
            value: amount,
        });
        Ok(())
    }

    /// Set a share allowance.
    pub fn approve_shares(&mut self, owner: PlayerId, spender: PlayerId, amount: u128) {
        self.stock.approve(owner, spender, amount);
        self.emit(GameEvent::StockApproval {
            owner,
            spender,
            value: amount,
        });
    }

    /// Move shares on an owner's behalf.
    pub fn transfer_shares_from(
        &mut self,
        spender: PlayerId,
        from: PlayerId,
        to: PlayerId,
        amount: u128,
    ) -> Result<(), GameError> {
        self.stock.transfer_from(spender, from, to, amount)?;
        self.emit(GameEvent::StockTransfer {
            from: Some(from),
            to: Some(to),
            value: amount,
        });
        Ok(())
    }

    /// Pay a holder's dividends into their wallet and burn their shares.
    pub fn redeem_shares(&mut self, holder: PlayerId) -> Result<Redemption, GameError> {
        let redemption = self.stock.redeem(holder, &mut self.wallet)?;
        if redemption.shares > 0 {
            self.emit(GameEvent::StockTransfer {
                from: Some(holder),
                to: None,
                value: redemption.shares,
            });
        }
        self.emit(GameEvent::SharesRedeemed {
            player: holder,
            shares: redemption.shares,
            dividends: redemption.dividends,
        });
        info!(%holder, shares = redemption.shares, dividends = redemption.dividends, "Shares redeemed");
        Ok(redemption)
    }

    // -----------------------------------------------------------------------
    // Altar
    // -----------------------------------------------------------------------

    /// The altar pool.
    pub const fn altar(&self) -> &AltarPool {
        &self.altar
    }

    /// Unallocated altar fund.
    pub const fn altar_fund(&self) -> u128 {
        self.altar.fund()
    }

    /// A day bucket, if opened.
    pub fn altar_record(&self, id: AltarRecordId) -> Option<AltarRecord> {
        self.altar.record(id)
    }

    /// A player's open altar position.
    pub fn trade_book(&self, player: PlayerId) -> Option<TradeBook> {
        self.altar.trade_book(player)
    }

    /// Deposit chicken into today's altar bucket.
    ///
    /// A matured position from an earlier day is settled first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRange`] for a zero amount and
    /// [`GameError::InsufficientResource`] if the player is short.
    pub fn chicken_to_altar(&mut self, player: PlayerId, amount: u128) -> Result<(), GameError> {
        if amount == 0 {
            return Err(GameError::invalid_range("altar deposit must be positive"));
        }
        let now = self.now();
        let today = self.today()?;
        require_chicken(self.player(player)?, amount, now)?;

        let outcome = self.altar.deposit(player, amount, today, &mut self.wallet)?;
        self.burn_chicken(player, amount, now)?;

        if let Some((id, currency_allocated)) = outcome.opened {
            self.emit(GameEvent::NewAltarRecord {
                id,
                currency_allocated,
            });
        }
        if let Some(settlement) = outcome.settled {
            self.emit(GameEvent::AltarSettlement {
                player,
                id: settlement.record_id,
                value: settlement.income,
            });
        }
        self.emit(GameEvent::AltarDeposit {
            player,
            id: outcome.record_id,
            value: amount,
        });
        Ok(())
    }

    /// Settle a matured altar position into the wallet. Returns the income,
    /// zero when there is no open position.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotMatured`] if the position was opened today.
    pub fn ethereum_from_altar(&mut self, player: PlayerId) -> Result<u128, GameError> {
        let today = self.today()?;
        let Some(settlement) = self.altar.settle(player, today, &mut self.wallet)? else {
            return Ok(0);
        };
        self.emit(GameEvent::AltarSettlement {
            player,
            id: settlement.record_id,
            value: settlement.income,
        });
        info!(%player, record = settlement.record_id, income = settlement.income, "Altar settled");
        Ok(settlement.income)
    }

    // -----------------------------------------------------------------------
    // Arena
    // -----------------------------------------------------------------------

    /// Seconds an attacker cools down after a successful attack.
    pub const fn cooldown_time(&self) -> u64 {
        self.cooldown_time
    }

    /// Attack another player.
    ///
    /// A repelled attack changes nothing and emits no event.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Cooldown`] if the attacker is still cooling
    /// down and [`GameError::InvalidRange`] for a self-attack.
    pub fn attack(
        &mut self,
        attacker: PlayerId,
        defender: PlayerId,
    ) -> Result<CombatOutcome, GameError> {
        let now = self.now();
        let offense = self.player(attacker)?;
        let defense = self.player(defender)?;
        arena::check_attack(offense, defense, now)?;
        let cooldown_until = now
            .checked_add(self.cooldown_time)
            .ok_or(GameError::overflow("cooldown"))?;
        let defender_balance = accrual::chicken_of(defense, now)?;
        let attacker_balance = accrual::chicken_of(offense, now)?;

        let weights = self.entropy.weights();
        let outcome = arena::resolve(
            self.player(attacker)?,
            self.player(defender)?,
            weights,
            defender_balance,
        );
        let CombatOutcome::Victory { booty, .. } = outcome else {
            debug!(%attacker, %defender, ?weights, "Attack repelled");
            return Ok(outcome);
        };
        attacker_balance
            .checked_add(booty)
            .ok_or(GameError::overflow("booty"))?;

        accrual::spend(self.player_mut(defender)?, booty, now)?;
        let record = self.player_mut(attacker)?;
        accrual::earn(record, booty, now)?;
        record.cooldown_until = cooldown_until;
        self.emit(GameEvent::Attack {
            attacker,
            defender,
            booty,
        });
        info!(%attacker, %defender, booty, ?weights, "Attack succeeded");
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Attribute tier pricing.
    pub const fn attribute_tiers(&self) -> AttributeTiers {
        self.tiers
    }

    /// Raise an attribute to level `to`, paying chicken and wei.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRange`] unless `current < to <= max`,
    /// [`GameError::InsufficientResource`] or
    /// [`GameError::InsufficientPayment`] if the player cannot pay.
    pub fn upgrade_attribute(
        &mut self,
        player: PlayerId,
        attribute: Attribute,
        to: u32,
        sent: u128,
    ) -> Result<(), GameError> {
        let now = self.now();
        let record = self.player(player)?;
        let tier = self.tiers.for_attribute(attribute);
        let cost = progression::attribute_cost(tier, record.attributes.level(attribute), to)?;
        require_chicken(record, cost.chicken, now)?;
        let plan = self.plan_payment(player, cost.ether, sent)?;

        let mut attributes = record.attributes;
        attributes.set_level(attribute, to);
        let mut powers = Vec::new();
        for &kind in progression::affected_stats(attribute) {
            let old = progression::stat_attribute_power(&record.attributes, kind)?;
            let new = progression::stat_attribute_power(&attributes, kind)?;
            let power = record
                .stat(kind)
                .power
                .checked_sub(old)
                .and_then(|base| base.checked_add(new))
                .ok_or(GameError::overflow("attribute power"))?;
            powers.push((kind, power));
        }

        self.burn_chicken(player, cost.chicken, now)?;
        let record = self.player_mut(player)?;
        record.attributes = attributes;
        for (kind, power) in powers {
            record.stat_mut(kind).power = power;
        }
        self.commit_payment(player, plan)?;
        self.emit(GameEvent::AttributeUpgrade {
            player,
            attribute,
            to,
        });
        info!(%player, %attribute, to, chicken = cost.chicken, ether = cost.ether, "Attribute upgraded");
        Ok(())
    }

    /// A pet template.
    pub fn pet(&self, id: PetId) -> Option<PetDefinition> {
        index(id).and_then(|idx| self.pets.get(idx)).copied()
    }

    /// Number of pet templates.
    pub fn pet_count(&self) -> usize {
        self.pets.len()
    }

    /// Buy `amount` levels of a pet.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPet`], [`GameError::InvalidRange`] for a
    /// zero amount or a level above the pet's max, or a payment error.
    pub fn buy_pets(
        &mut self,
        player: PlayerId,
        pet_id: PetId,
        amount: u32,
        sent: u128,
    ) -> Result<(), GameError> {
        let now = self.now();
        let pet = self.pet(pet_id).ok_or(GameError::UnknownPet { pet: pet_id })?;
        let record = self.player(player)?;
        let level = record.pet_level(pet_id);
        let cost = progression::pet_cost(&pet, level, amount)?;
        require_chicken(record, cost.chicken, now)?;
        let plan = self.plan_payment(player, cost.ether, sent)?;

        let mut powers = Vec::new();
        for kind in [StatKind::Hunting, StatKind::Offense, StatKind::Defense] {
            let power = record
                .stat(kind)
                .power
                .checked_add(progression::pet_power(&pet, kind, amount)?)
                .ok_or(GameError::overflow("pet power"))?;
            powers.push((kind, power));
        }
        let new_level = level.saturating_add(amount);

        self.burn_chicken(player, cost.chicken, now)?;
        let record = self.player_mut(player)?;
        for (kind, power) in powers {
            record.stat_mut(kind).power = power;
        }
        record.set_pet_level(pet_id, new_level);
        self.commit_payment(player, plan)?;
        self.emit(GameEvent::PetLevelUp {
            player,
            pet: pet_id,
            level: new_level,
        });
        info!(%player, pet = pet_id, level = new_level, "Pet levelled up");
        Ok(())
    }

    /// Depot pricing.
    pub const fn depot(&self) -> DepotTier {
        self.depot
    }

    /// Buy `amount` depots.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidRange`] for a zero amount or a count
    /// above the depot max, or a payment error.
    pub fn buy_depots(&mut self, player: PlayerId, amount: u32, sent: u128) -> Result<(), GameError> {
        let record = self.player(player)?;
        let current = record.depots;
        let cost = progression::depot_cost(&self.depot, current, amount)?;
        let plan = self.plan_payment(player, cost, sent)?;
        let depots = current.saturating_add(amount);

        self.player_mut(player)?.depots = depots;
        self.commit_payment(player, plan)?;
        self.emit(GameEvent::DepotUpgrade { player, depots });
        info!(%player, depots, "Depots bought");
        Ok(())
    }

    /// An item.
    pub fn item(&self, id: ItemId) -> Option<Item> {
        index(id).and_then(|idx| self.items.get(idx)).copied()
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Buy an item from its current owner at a 20% markup.
    ///
    /// The seller receives 110% of what they paid; the rest of the price
    /// goes to the developer fee. The item's bonuses move from seller to
    /// buyer.
    pub fn buy_item(&mut self, buyer: PlayerId, item_id: ItemId, sent: u128) -> Result<(), GameError> {
        let now = self.now();
        let item = self.item(item_id).ok_or(GameError::UnknownItem { item: item_id })?;
        let seller = item.owner;
        let markup = progression::markup(item.cost)?;
        let refund = sent.checked_sub(markup.price).ok_or(GameError::InsufficientPayment {
            required: markup.price,
            sent,
        })?;

        let mut buyer_record = self.player(buyer)?.clone();
        let mut seller_record = self.player(seller)?.clone();
        accrual::settle(&mut seller_record, now)?;
        apply_item_bonus(&mut seller_record, &item, false)?;
        if seller == buyer {
            buyer_record = seller_record.clone();
        } else {
            accrual::settle(&mut buyer_record, now)?;
        }
        apply_item_bonus(&mut buyer_record, &item, true)?;

        self.wallet.ensure_credit(seller, markup.seller_share)?;
        self.wallet.ensure_credit(buyer, refund)?;
        let dev_fee = self
            .committee
            .dev_fee
            .checked_add(markup.dev_share)
            .ok_or(GameError::overflow("dev fee"))?;
        let total_received = self
            .total_received
            .checked_add(sent)
            .ok_or(GameError::overflow("total received"))?;

        self.wallet.credit(seller, markup.seller_share)?;
        self.wallet.credit(buyer, refund)?;
        self.committee.dev_fee = dev_fee;
        self.total_received = total_received;
        self.players.insert(seller, seller_record);
        self.players.insert(buyer, buyer_record);
        if let Some(slot) = index(item_id).and_then(|idx| self.items.get_mut(idx)) {
            slot.owner = buyer;
            slot.cost = markup.price;
        }
        self.emit(GameEvent::ItemPurchase {
            buyer,
            seller,
            item: item_id,
            price: markup.price,
        });
        info!(%buyer, %seller, item = item_id, price = markup.price, "Item bought");
        Ok(())
    }

    /// The store slot.
    pub const fn store(&self) -> StoreSlot {
        self.store
    }

    /// Buy the store at a 20% markup.
    ///
    /// The previous owner receives 110% of what they paid plus the
    /// accumulated store balance, which resets.
    pub fn buy_store(&mut self, buyer: PlayerId, sent: u128) -> Result<(), GameError> {
        self.player(buyer)?;
        let seller = self.store.owner;
        let markup = progression::markup(self.store.cost)?;
        let refund = sent.checked_sub(markup.price).ok_or(GameError::InsufficientPayment {
            required: markup.price,
            sent,
        })?;
        let payout = markup
            .seller_share
            .checked_add(self.store.balance)
            .ok_or(GameError::overflow("store payout"))?;
        self.wallet.ensure_credit(seller, payout)?;
        self.wallet.ensure_credit(buyer, refund)?;
        let dev_fee = self
            .committee
            .dev_fee
            .checked_add(markup.dev_share)
            .ok_or(GameError::overflow("dev fee"))?;
        let total_received = self
            .total_received
            .checked_add(sent)
            .ok_or(GameError::overflow("total received"))?;

        self.wallet.credit(seller, payout)?;
        self.wallet.credit(buyer, refund)?;
        self.committee.dev_fee = dev_fee;
        self.total_received = total_received;
        self.store = StoreSlot {
            owner: buyer,
            cost: markup.price,
            balance: 0,
        };
        self.emit(GameEvent::StorePurchase {
            buyer,
            seller,
            price: markup.price,
        });
        info!(%buyer, %seller, price = markup.price, "Store bought");
        Ok(())
    }

    /// Pay the accumulated store balance to the store owner. Anyone may
    /// call this. Returns the wei paid.
    pub fn withdraw_store_balance(&mut self) -> Result<u128, GameError> {
        let owner = self.store.owner;
        let value = self.store.balance;
        self.wallet.credit(owner, value)?;
        self.store.balance = 0;
        if value > 0 {
            self.emit(GameEvent::StoreBalanceWithdrawn { owner, value });
            info!(%owner, value, "Store balance withdrawn");
        }
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------------

    /// Current distribution table.
    pub const fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Every currency total at this instant.
    pub fn solvency_snapshot(&self) -> Result<SolvencySnapshot, GameError> {
        Ok(SolvencySnapshot {
            received: self.total_received,
            withdrawn: self.wallet.withdrawn(),
            wallets: self.wallet.outstanding(),
            pending_dividends: self.stock.total_pending_dividends()?,
            altar_fund: self.altar.fund(),
            altar_reserved: self.altar.reserved(),
            store_balance: self.store.balance,
            dev_fee: self.committee.dev_fee,
        })
    }

    /// Verify that every wei the game owes is covered by what it received.
    pub fn audit_solvency(&self) -> Result<SolvencyResult, GameError> {
        Ok(verify_solvency(&self.solvency_snapshot()?))
    }
}

/// Add or remove an item's multiplier bonuses. The player must already be
/// settled.
pub(crate) fn apply_item_bonus(player: &mut Player, item: &Item, add: bool) -> Result<(), GameError> {
    for kind in [StatKind::Hunting, StatKind::Offense, StatKind::Defense] {
        let stat = player.stat_mut(kind);
        let bonus = item.bonus(kind);
        stat.multiplier = if add {
            stat.multiplier.checked_add(bonus)
        } else {
            stat.multiplier.checked_sub(bonus)
        }
        .ok_or(GameError::overflow("item bonus"))?;
    }
    Ok(())
}

/// Check that `player` holds at least `amount` chicken at `now`.
fn require_chicken(player: &Player, amount: u128, now: u64) -> Result<(), GameError> {
    let available = accrual::chicken_of(player, now)?;
    if available < amount {
        return Err(GameError::InsufficientResource {
            player: player.id,
            required: amount,
            available,
        });
    }
    Ok(())
}

/// Catalogue index for an id.
pub(crate) fn index(id: u32) -> Option<usize> {
    usize::try_from(id).ok()
}
