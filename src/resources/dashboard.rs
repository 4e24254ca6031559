use crate::Client;
use crate::errors::PfolioError;
use crate::fanout::{settle_all, value_or_default};
use crate::models::DashboardStats;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Stat {
    Skills,
    Certifications,
    Projects,
    Messages,
}

impl Stat {
    const fn name(self) -> &'static str {
        match self {
            Self::Skills => "skills",
            Self::Certifications => "certifications",
            Self::Projects => "projects",
            Self::Messages => "messages",
        }
    }
}

impl Client {
    /// Loads the four dashboard counts concurrently.
    ///
    /// Never fails: a count that cannot be loaded is logged and reported as 0,
    /// while the other counts keep their real values.
    pub async fn dashboard_stats(&self) -> DashboardStats {
        let tasks: Vec<(Stat, BoxFuture<'_, Result<u64, PfolioError>>)> = vec![
            (Stat::Skills, self.count_skills().boxed()),
            (Stat::Certifications, self.count_certifications().boxed()),
            (Stat::Projects, self.count_projects().boxed()),
            (Stat::Messages, self.count_messages().boxed()),
        ];

        let mut stats = DashboardStats::default();
        for (stat, result) in settle_all(tasks).await {
            let count = value_or_default(stat.name(), result, 0);
            match stat {
                Stat::Skills => stats.skills = count,
                Stat::Certifications => stats.certifications = count,
                Stat::Projects => stats.projects = count,
                Stat::Messages => stats.messages = count,
            }
        }
        debug!("Dashboard stats: {stats:?}");
        stats
    }
}
