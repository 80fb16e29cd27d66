use crate::{ResultEngine, Window, analytics};

use super::Engine;

impl Engine {
    pub async fn today_expenses(&self, owner_id: i64) -> ResultEngine<String> {
        let now = self.now();
        let expenses = self
            .storage
            .query_expenses(owner_id, Window::Today.range(now))
            .await?;
        Ok(analytics::today(&expenses, now, self.currency))
    }

    pub async fn week_expenses(&self, owner_id: i64) -> ResultEngine<String> {
        let now = self.now();
        let expenses = self
            .storage
            .query_expenses(owner_id, Window::ThisWeek.range(now))
            .await?;
        Ok(analytics::week(&expenses, now, self.currency))
    }

    pub async fn month_expenses(&self, owner_id: i64) -> ResultEngine<String> {
        let now = self.now();
        let expenses = self
            .storage
            .query_expenses(owner_id, Window::ThisMonth.range(now))
            .await?;
        Ok(analytics::month(&expenses, now, self.currency))
    }

    /// All-time statistics.
    pub async fn stats_expenses(&self, owner_id: i64) -> ResultEngine<String> {
        let now = self.now();
        let expenses = self
            .storage
            .query_expenses(owner_id, Window::AllTime.range(now))
            .await?;
        Ok(analytics::stats(&expenses, now, self.currency))
    }
}
