//! Leaderboard commands.
//!
//! Each command reads the stores, runs the ranking pipeline and replies
//! through the [`MessageSender`]. Image rendering failures are reported to
//! the user and answered with the plain-text ranking instead.

use std::sync::Arc;

use chrono::Utc;
use rank_common::{RankConfig, RankEntry, RankResult, RankStyle};
use ranking::balance::{account_not_found, describe_balances};
use ranking::display::beijing_timestamp;
use ranking::{build_ranking, effective_display_size, format_ranking_text, to_render_data, RankScope};
use renderer::list::list_rows;
use renderer::{compose, compose_list, AssetIndex, LayoutOptions, PageRenderer};
use storage::{
    record_author, AvatarFetcher, BindingStore, IdentityStore, IdentityUpdate, Ledger,
    ObservedMessage,
};
use tracing::{error, info, instrument};

use crate::sender::{MessageSender, Outgoing};

/// Reply sent when an image could not be produced.
pub const RENDER_FAILED_REPLY: &str = "生成排行榜图片失败，请检查后台日志。";

/// Reply sent when the account binding lookup fails.
pub const LOOKUP_FAILED_REPLY: &str = "查询用户信息失败，请稍后重试。";

/// Who invoked a command, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub user_name: String,
    pub channel_id: String,
    pub platform: String,
}

/// Collaborators shared by every command.
pub struct RankService {
    pub config: RankConfig,
    pub ledger: Arc<dyn Ledger>,
    pub identities: Arc<dyn IdentityStore>,
    pub bindings: Arc<dyn BindingStore>,
    pub assets: Arc<AssetIndex>,
    pub avatars: AvatarFetcher,
    pub renderer: Arc<dyn PageRenderer>,
    pub sender: Arc<dyn MessageSender>,
}

impl RankService {
    /// Ranking of the invoking channel.
    pub async fn channel_rank(&self, session: &Session, size: Option<f64>) -> RankResult<()> {
        self.rank(session, RankScope::Channel(session.channel_id.clone()), size)
            .await
    }

    /// Ranking across every channel of the platform.
    pub async fn global_rank(&self, session: &Session, size: Option<f64>) -> RankResult<()> {
        self.rank(session, RankScope::Global, size).await
    }

    #[instrument(skip(self, session), fields(channel_id = %session.channel_id, platform = %session.platform))]
    async fn rank(&self, session: &Session, scope: RankScope, size: Option<f64>) -> RankResult<()> {
        let size = effective_display_size(size, self.config.default_display_count);
        let channel = match &scope {
            RankScope::Channel(channel) => Some(channel.as_str()),
            RankScope::Global => None,
        };

        let balances = self.ledger.balances().await?;
        let identities = self.identities.identities(&session.platform, channel).await?;
        let bindings = self.bindings.bindings(&session.platform).await?;
        let entries = scope.apply(build_ranking(&balances, &identities, &bindings), size);
        info!(rows = entries.len(), size, "Ranking computed");

        let title = scope.title();
        if self.config.display_as_image {
            match self.render_image(title, &entries).await {
                Ok(png) => {
                    return self
                        .sender
                        .send(&session.channel_id, Outgoing::Image(png))
                        .await;
                }
                Err(e) if e.is_render_failure() => {
                    error!(error = %e, "Failed to render leaderboard image");
                    self.sender
                        .send(
                            &session.channel_id,
                            Outgoing::Text(RENDER_FAILED_REPLY.to_string()),
                        )
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }

        self.sender
            .send(
                &session.channel_id,
                Outgoing::Text(format_ranking_text(title, &entries)),
            )
            .await
    }

    async fn render_image(&self, title: &str, entries: &[RankEntry]) -> RankResult<Vec<u8>> {
        let document = match self.config.style {
            RankStyle::Bars => {
                let mut data = to_render_data(entries);
                self.avatars.fetch_all(&mut data).await;
                compose(
                    title,
                    Some(beijing_timestamp(Utc::now())),
                    data,
                    Arc::clone(&self.assets),
                    LayoutOptions::from(&self.config),
                )
            }
            RankStyle::List => compose_list(title, list_rows(entries)),
        };

        self.renderer
            .render(&document, self.config.render_readiness)
            .await
    }

    /// Balance of the invoking user, or of `target` (`(user id, name)`).
    #[instrument(skip(self, session))]
    pub async fn balance(
        &self,
        session: &Session,
        target: Option<(String, String)>,
        currency: Option<String>,
    ) -> RankResult<()> {
        let (user_id, name) =
            target.unwrap_or_else(|| (session.user_id.clone(), session.user_name.clone()));

        let reply = match self.bindings.binding(&user_id, &session.platform).await {
            Ok(Some(binding)) => {
                let records = self
                    .ledger
                    .balance(binding.owner_id, currency.as_deref())
                    .await?;
                describe_balances(&name, &records, currency.as_deref())
            }
            Ok(None) => account_not_found(&name),
            Err(e) => {
                error!(error = %e, user_id = %user_id, "Failed to look up account binding");
                LOOKUP_FAILED_REPLY.to_string()
            }
        };

        self.sender
            .send(&session.channel_id, Outgoing::Text(reply))
            .await
    }

    /// Track the author of an observed message.
    pub async fn observe(&self, message: &ObservedMessage) -> RankResult<IdentityUpdate> {
        record_author(self.identities.as_ref(), self.bindings.as_ref(), message).await
    }
}
