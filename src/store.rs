// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent trade table.
//!
//! [`TradeStore`] owns the SQLite connection for the lifetime of the process and
//! is handed to command handlers explicitly. Writes replace whole rows; missing
//! ids are reported through the returned `bool` instead of an error.

use crate::db;
use crate::models::{NewTrade, Trade};
use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const COLUMNS: &str = "id, date, instrument, direction, quantity, entry_price, exit_price, \
     stop_loss, take_profit, risk_to_reward, outcome, profit_loss, tags, notes, bos, retest, \
     fib_retracement";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Id ascending, i.e. the order trades were recorded in.
    #[default]
    Inserted,
    /// Newest date first; ties broken by newest id.
    DateDesc,
}

impl ListOrder {
    fn sql(&self) -> &'static str {
        match self {
            ListOrder::Inserted => "ORDER BY id ASC",
            ListOrder::DateDesc => "ORDER BY date DESC, id DESC",
        }
    }
}

struct CachedList {
    taken_at: Instant,
    order: ListOrder,
    rows: Vec<Trade>,
}

pub struct TradeStore {
    conn: Connection,
    cache_ttl: Option<Duration>,
    cache: RefCell<Option<CachedList>>,
}

impl TradeStore {
    /// Wrap an existing connection. The schema is not touched.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            cache_ttl: None,
            cache: RefCell::new(None),
        }
    }

    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new(db::open(path)?);
        store.create_schema()?;
        Ok(store)
    }

    /// Keep the last `list_all` result for `ttl`. Every write drops it.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn create_schema(&self) -> Result<()> {
        db::init_schema(&self.conn)
    }

    pub fn append(&self, trade: &NewTrade) -> Result<i64> {
        insert(&self.conn, trade)?;
        let id = self.conn.last_insert_rowid();
        self.invalidate();
        info!(id, instrument = %trade.instrument, "trade recorded");
        Ok(id)
    }

    /// Insert every trade inside one transaction; nothing is kept if any row fails.
    pub fn append_all(&mut self, trades: &[NewTrade]) -> Result<Vec<i64>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(trades.len());
        for (n, trade) in trades.iter().enumerate() {
            insert(&tx, trade).with_context(|| format!("Insert trade #{}", n + 1))?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()?;
        self.invalidate();
        info!(count = ids.len(), "trades recorded");
        Ok(ids)
    }

    pub fn list_all(&self, order: ListOrder) -> Result<Vec<Trade>> {
        if let Some(ttl) = self.cache_ttl {
            if let Some(cached) = self.cache.borrow().as_ref() {
                if cached.order == order && cached.taken_at.elapsed() < ttl {
                    debug!(rows = cached.rows.len(), "serving trades from cache");
                    return Ok(cached.rows.clone());
                }
            }
        }

        let sql = format!("SELECT {} FROM trades {}", COLUMNS, order.sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], trade_from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row.context("Failed to read trade row")?);
        }
        debug!(rows = data.len(), ?order, "loaded trades");

        if self.cache_ttl.is_some() {
            *self.cache.borrow_mut() = Some(CachedList {
                taken_at: Instant::now(),
                order,
                rows: data.clone(),
            });
        }
        Ok(data)
    }

    /// Drop the cached list so the next read goes to the database.
    pub fn refresh(&self) {
        self.invalidate();
    }

    pub fn get(&self, id: i64) -> Result<Option<Trade>> {
        let sql = format!("SELECT {} FROM trades WHERE id=?1", COLUMNS);
        let trade = self
            .conn
            .query_row(&sql, params![id], trade_from_row)
            .optional()
            .with_context(|| format!("Failed to read trade {}", id))?;
        Ok(trade)
    }

    /// Replace every field of trade `id`. Returns false when no row has that id.
    pub fn update(&self, id: i64, trade: &NewTrade) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE trades SET date=?1, instrument=?2, direction=?3, quantity=?4, entry_price=?5,
                exit_price=?6, stop_loss=?7, take_profit=?8, risk_to_reward=?9, outcome=?10,
                profit_loss=?11, tags=?12, notes=?13, bos=?14, retest=?15, fib_retracement=?16
             WHERE id=?17",
            params![
                trade.date,
                trade.instrument,
                trade.direction,
                trade.quantity,
                trade.entry_price.to_string(),
                trade.exit_price.map(|d| d.to_string()),
                trade.stop_loss.to_string(),
                trade.take_profit.to_string(),
                trade.risk_to_reward.to_string(),
                trade.outcome,
                trade.profit_loss.to_string(),
                trade.tags,
                trade.notes,
                trade.bos,
                trade.retest,
                trade.fib_retracement,
                id
            ],
        )?;
        self.invalidate();
        if changed == 0 {
            warn!(id, "update matched no trade");
        } else {
            info!(id, "trade replaced");
        }
        Ok(changed > 0)
    }

    /// Remove trade `id`. Returns false when no row has that id.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM trades WHERE id=?1", params![id])?;
        self.invalidate();
        if changed == 0 {
            warn!(id, "delete matched no trade");
        } else {
            info!(id, "trade deleted");
        }
        Ok(changed > 0)
    }

    fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }
}

fn insert(conn: &Connection, trade: &NewTrade) -> Result<()> {
    conn.execute(
        "INSERT INTO trades(date, instrument, direction, quantity, entry_price, exit_price,
            stop_loss, take_profit, risk_to_reward, outcome, profit_loss, tags, notes, bos,
            retest, fib_retracement)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        params![
            trade.date,
            trade.instrument,
            trade.direction,
            trade.quantity,
            trade.entry_price.to_string(),
            trade.exit_price.map(|d| d.to_string()),
            trade.stop_loss.to_string(),
            trade.take_profit.to_string(),
            trade.risk_to_reward.to_string(),
            trade.outcome,
            trade.profit_loss.to_string(),
            trade.tags,
            trade.notes,
            trade.bos,
            trade.retest,
            trade.fib_retracement
        ],
    )?;
    Ok(())
}

fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = r.get(idx)?;
    match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<Decimal>().map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}

fn trade_from_row(r: &Row<'_>) -> rusqlite::Result<Trade> {
    let fib_raw: Option<String> = r.get(16)?;
    let fib_retracement = match fib_raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Some(s.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(16, Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(Trade {
        id: r.get(0)?,
        fields: NewTrade {
            date: r.get(1)?,
            instrument: r.get(2)?,
            direction: r.get(3)?,
            quantity: r.get(4)?,
            entry_price: decimal_at(r, 5)?,
            exit_price: opt_decimal_at(r, 6)?,
            stop_loss: decimal_at(r, 7)?,
            take_profit: decimal_at(r, 8)?,
            risk_to_reward: decimal_at(r, 9)?,
            outcome: r.get(10)?,
            profit_loss: decimal_at(r, 11)?,
            tags: r.get(12)?,
            notes: r.get(13)?,
            bos: r.get(14)?,
            retest: r.get(15)?,
            fib_retracement,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use rust_decimal_macros::dec;

    fn store() -> TradeStore {
        let store = TradeStore::new(Connection::open_in_memory().unwrap());
        store.create_schema().unwrap();
        store
    }

    fn sample(date: &str, pnl: Decimal) -> NewTrade {
        NewTrade {
            date: date.into(),
            instrument: "Nifty".into(),
            direction: Direction::Buy,
            quantity: Some(50),
            entry_price: dec!(22000),
            exit_price: None,
            stop_loss: dec!(21950),
            take_profit: dec!(22100),
            risk_to_reward: dec!(2),
            outcome: None,
            profit_loss: pnl,
            tags: None,
            notes: None,
            bos: false,
            retest: false,
            fib_retracement: None,
        }
    }

    #[test]
    fn cache_is_dropped_by_writes() {
        let store = store().with_cache_ttl(Duration::from_secs(600));
        assert!(store.list_all(ListOrder::Inserted).unwrap().is_empty());

        let id = store.append(&sample("2025-03-01", dec!(10))).unwrap();
        assert_eq!(store.list_all(ListOrder::Inserted).unwrap().len(), 1);

        store.delete(id).unwrap();
        assert!(store.list_all(ListOrder::Inserted).unwrap().is_empty());
    }

    #[test]
    fn cache_serves_reads_until_refresh() {
        let store = store().with_cache_ttl(Duration::from_secs(600));
        store.append(&sample("2025-03-01", dec!(10))).unwrap();
        assert_eq!(store.list_all(ListOrder::Inserted).unwrap().len(), 1);

        // A write through another handle is invisible to the cache.
        store.conn().execute("DELETE FROM trades", []).unwrap();
        assert_eq!(store.list_all(ListOrder::Inserted).unwrap().len(), 1);

        store.refresh();
        assert!(store.list_all(ListOrder::Inserted).unwrap().is_empty());
    }

    #[test]
    fn date_desc_breaks_ties_by_newest_id() {
        let store = store();
        let a = store.append(&sample("2025-03-01", dec!(1))).unwrap();
        let b = store.append(&sample("2025-03-02", dec!(2))).unwrap();
        let c = store.append(&sample("2025-03-02", dec!(3))).unwrap();
        let ids: Vec<i64> = store
            .list_all(ListOrder::DateDesc)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[test]
    fn append_all_rolls_back_on_failure() {
        let mut store = store();
        let mut bad = sample("2025-03-02", dec!(2));
        bad.quantity = Some(0);
        let err = store
            .append_all(&[sample("2025-03-01", dec!(1)), bad])
            .unwrap_err();
        assert!(err.to_string().contains("Insert trade #2"));
        assert!(store.list_all(ListOrder::Inserted).unwrap().is_empty());
    }
}
