use serde::Serialize;
use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://api.tinybird.co/v0/pipes";

/// How a panel draws its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Line,
    Bar,
    Proportion,
    Table,
}

/// Which dashboard panel column an endpoint is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    EditsOverTime,
    BotVsHuman,
    TopServers,
    TopUsers,
    TopPages,
}

impl EndpointRole {
    pub const ALL: [EndpointRole; 5] = [
        EndpointRole::EditsOverTime,
        EndpointRole::BotVsHuman,
        EndpointRole::TopServers,
        EndpointRole::TopUsers,
        EndpointRole::TopPages,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EndpointRole::EditsOverTime => "edits_over_time",
            EndpointRole::BotVsHuman => "bot_vs_human",
            EndpointRole::TopServers => "top_servers",
            EndpointRole::TopUsers => "top_users",
            EndpointRole::TopPages => "top_pages",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.key() == key)
    }

    /// Pipe name on the analytics host.
    pub fn pipe(self) -> &'static str {
        match self {
            EndpointRole::EditsOverTime => "wiki_events_pipe_edit_time",
            EndpointRole::BotVsHuman => "wiki_events_pipe_bot_human",
            EndpointRole::TopServers => "wiki_events_pipe_server",
            EndpointRole::TopUsers => "wiki_events_pipe_users",
            EndpointRole::TopPages => "wiki_events_pipe_pages",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EndpointRole::EditsOverTime => "Edits over time (last 24h)",
            EndpointRole::BotVsHuman => "Bot vs human",
            EndpointRole::TopServers => "Top 10 languages (server)",
            EndpointRole::TopUsers => "Top 10 most active users/bots",
            EndpointRole::TopPages => "Top 10 most edited pages",
        }
    }

    pub fn strategy(self) -> RenderStrategy {
        match self {
            EndpointRole::EditsOverTime => RenderStrategy::Line,
            EndpointRole::BotVsHuman => RenderStrategy::Proportion,
            EndpointRole::TopServers => RenderStrategy::Bar,
            EndpointRole::TopUsers | EndpointRole::TopPages => RenderStrategy::Table,
        }
    }

    pub fn column(self) -> Column {
        match self {
            EndpointRole::EditsOverTime | EndpointRole::TopServers | EndpointRole::TopPages => {
                Column::Left
            }
            EndpointRole::BotVsHuman | EndpointRole::TopUsers => Column::Right,
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub role: EndpointRole,
    pub url: String,
}

impl Endpoint {
    pub fn new(role: EndpointRole, url: impl Into<String>) -> Self {
        Self {
            role,
            url: url.into(),
        }
    }
}

/// The five endpoints, in page order, rooted at `api_base`.
pub fn endpoints(api_base: &str) -> Vec<Endpoint> {
    let base = api_base.trim_end_matches('/');
    EndpointRole::ALL
        .into_iter()
        .map(|role| Endpoint::new(role, format!("{base}/{}.json", role.pipe())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_follow_pipe_names() {
        let list = endpoints("https://api.tinybird.co/v0/pipes/");
        assert_eq!(list.len(), 5);
        assert_eq!(
            list[0].url,
            "https://api.tinybird.co/v0/pipes/wiki_events_pipe_edit_time.json"
        );
        assert_eq!(list[1].role, EndpointRole::BotVsHuman);
    }

    #[test]
    fn role_keys_round_trip() {
        for role in EndpointRole::ALL {
            assert_eq!(EndpointRole::from_key(role.key()), Some(role));
        }
        assert_eq!(EndpointRole::from_key("nope"), None);
    }
}
