//! Per-user score aggregation for a hunt.

use crate::error::HuntError;
use crate::store::HuntStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScore {
    pub user: String,
    pub total: i64,
}

/// Fold the hunt's stored values into per-user totals, in first-seen order.
pub fn tally(store: &HuntStore, hunt: &str) -> Result<Vec<UserScore>, HuntError> {
    let mut scores: Vec<UserScore> = Vec::new();
    for record in store.scan(hunt)? {
        let record = record?;
        match scores.iter_mut().find(|s| s.user == record.user) {
            Some(score) => score.total += record.value as i64,
            None => scores.push(UserScore {
                user: record.user,
                total: record.value as i64,
            }),
        }
    }
    Ok(scores)
}

/// The highest total; ties go to the first-seen user.
pub fn winner(scores: &[UserScore]) -> Option<&UserScore> {
    let mut best: Option<&UserScore> = None;
    for score in scores {
        if best.is_none_or(|b| score.total > b.total) {
            best = Some(score);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TreasureFields;

    fn seed(store: &HuntStore, hunt: &str, rows: &[(&str, i32)]) {
        for (user, value) in rows {
            store
                .append(
                    hunt,
                    TreasureFields {
                        user: (*user).into(),
                        latitude: 0.0,
                        longitude: 0.0,
                        clue: String::new(),
                        value: *value,
                    },
                )
                .unwrap();
        }
    }

    #[test]
    fn test_tally_and_winner() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        seed(&store, "h", &[("al", 5), ("bo", 7), ("al", 3)]);

        let scores = tally(&store, "h")?;
        assert_eq!(
            scores,
            vec![
                UserScore {
                    user: "al".into(),
                    total: 8
                },
                UserScore {
                    user: "bo".into(),
                    total: 7
                },
            ]
        );
        assert_eq!(winner(&scores).unwrap().user, "al");
        Ok(())
    }

    #[test]
    fn test_winner_tie_breaks_first_seen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        seed(&store, "h", &[("bo", 4), ("al", 4)]);

        let scores = tally(&store, "h")?;
        assert_eq!(winner(&scores).unwrap().user, "bo");
        Ok(())
    }

    #[test]
    fn test_tally_empty_hunt() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        store.append(
            "h",
            TreasureFields {
                user: "al".into(),
                latitude: 0.0,
                longitude: 0.0,
                clue: String::new(),
                value: 1,
            },
        )?;
        store.delete("h", 1)?;
        assert!(tally(&store, "h")?.is_empty());
        Ok(())
    }
}
