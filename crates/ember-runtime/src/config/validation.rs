//! The configuration validation pipeline.
//!
//! Rules are checked in a fixed order and the first violation wins:
//!
//! 1. `plugins` key present
//! 2. `plugins` is a non-empty list
//! 3. every `plugins` element is a plugin
//! 4. every global plugin's subscription declaration is valid
//! 5. `connections` key present
//! 6. `connections` is a non-empty list
//! 7. every `connections` element is a connection
//! 8. every connection-scoped plugin's subscription declaration is valid,
//!    in connection order then plugin order
//!
//! Note the asymmetry: global plugin subscriptions (rule 4) are checked
//! before the `connections` key is even looked at. That ordering is
//! observable and kept deliberately.

use std::sync::Arc;

use ember_core::{Connection, ConnectionEntry, DispatchTopology, Plugin, PluginEntry};

use super::error::{ConfigError, ConfigResult};
use super::{Config, ConfigItem, ConfigValue};

/// Validates `config` and derives the dispatch topology from it.
///
/// On success every plugin's subscription table has been resolved exactly
/// once and the returned topology is ready for the dispatcher. On failure
/// the error identifies the first rule violated.
pub fn validate(config: &Config) -> ConfigResult<DispatchTopology> {
    let plugins = validate_plugins(config)?;
    let global = plugins
        .into_iter()
        .map(PluginEntry::resolve)
        .collect::<Result<Vec<_>, _>>()?;

    let connections = validate_connections(config)?;
    let connections = connections
        .into_iter()
        .map(ConnectionEntry::resolve)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DispatchTopology::new(global, connections))
}

/// Rules 1-3: the `plugins` key references a non-empty list of plugins.
fn validate_plugins(config: &Config) -> ConfigResult<Vec<Arc<dyn Plugin>>> {
    let value = config.plugins_entry().ok_or(ConfigError::MissingPlugins)?;
    let items = match value {
        ConfigValue::List(items) if !items.is_empty() => items,
        _ => return Err(ConfigError::MalformedPlugins),
    };
    items
        .iter()
        .map(|item| match item {
            ConfigItem::Plugin(plugin) => Ok(Arc::clone(plugin)),
            ConfigItem::Connection(_) => Err(ConfigError::NotAPlugin),
        })
        .collect()
}

/// Rules 5-7: the `connections` key references a non-empty list of
/// connections.
fn validate_connections(config: &Config) -> ConfigResult<Vec<Arc<Connection>>> {
    let value = config
        .connections_entry()
        .ok_or(ConfigError::MissingConnections)?;
    let items = match value {
        ConfigValue::List(items) if !items.is_empty() => items,
        _ => return Err(ConfigError::MalformedConnections),
    };
    items
        .iter()
        .map(|item| match item {
            ConfigItem::Connection(connection) => Ok(Arc::clone(connection)),
            ConfigItem::Plugin(_) => Err(ConfigError::NotAConnection),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{SubscriptionMap, Subscriptions};

    struct ValidPlugin;

    impl Plugin for ValidPlugin {
        fn name(&self) -> &str {
            "ValidPlugin"
        }

        fn subscribed_events(&self) -> Subscriptions {
            SubscriptionMap::new().on("received.privmsg", |_, _| {}).into()
        }
    }

    struct NonMapPlugin;

    impl Plugin for NonMapPlugin {
        fn name(&self) -> &str {
            "NonMapPlugin"
        }

        fn subscribed_events(&self) -> Subscriptions {
            Subscriptions::Other(serde_json::json!("foo"))
        }
    }

    struct BlankKeyPlugin;

    impl Plugin for BlankKeyPlugin {
        fn name(&self) -> &str {
            "BlankKeyPlugin"
        }

        fn subscribed_events(&self) -> Subscriptions {
            SubscriptionMap::new().on("", |_, _| {}).into()
        }
    }

    fn valid_plugin() -> Arc<dyn Plugin> {
        Arc::new(ValidPlugin)
    }

    fn connection() -> Arc<Connection> {
        Arc::new(Connection::new("irc.example.net", "ember"))
    }

    fn assert_fails(config: Config, message: &str) {
        let err = validate(&config).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn missing_plugins_key() {
        assert_fails(Config::new(), "Configuration must contain a \"plugins\" key");
    }

    #[test]
    fn non_list_plugins_value() {
        assert_fails(
            Config::new().plugins_value(ConfigValue::Other(serde_json::json!("foo"))),
            "Configuration \"plugins\" key must reference a non-empty array",
        );
    }

    #[test]
    fn empty_plugins_list() {
        assert_fails(
            Config::new().plugins(vec![]),
            "Configuration \"plugins\" key must reference a non-empty array",
        );
    }

    #[test]
    fn plugins_list_with_a_non_plugin() {
        assert_fails(
            Config::new().plugins_value(ConfigValue::List(vec![ConfigItem::Connection(
                connection(),
            )])),
            "All configuration \"plugins\" array values must implement PluginInterface",
        );
    }

    #[test]
    fn plugin_declaring_a_non_map() {
        assert_fails(
            Config::new().plugins(vec![Arc::new(NonMapPlugin)]),
            "Plugin of class NonMapPlugin has getSubscribedEvents() \
             implementation that does not return an array",
        );
    }

    #[test]
    fn plugin_declaring_a_blank_event_name() {
        assert_fails(
            Config::new().plugins(vec![Arc::new(BlankKeyPlugin)]),
            "Plugin of class BlankKeyPlugin returns non-string event name \
             or invalid callback for event \"\"",
        );
    }

    #[test]
    fn missing_connections_key() {
        assert_fails(
            Config::new().plugins(vec![valid_plugin()]),
            "Configuration must contain a \"connections\" key",
        );
    }

    #[test]
    fn non_list_connections_value() {
        assert_fails(
            Config::new()
                .plugins(vec![valid_plugin()])
                .connections_value(ConfigValue::Other(serde_json::json!("foo"))),
            "Configuration \"connections\" key must reference a non-empty array",
        );
    }

    #[test]
    fn empty_connections_list() {
        assert_fails(
            Config::new().plugins(vec![valid_plugin()]).connections(vec![]),
            "Configuration \"connections\" key must reference a non-empty array",
        );
    }

    #[test]
    fn connections_list_with_a_non_connection() {
        assert_fails(
            Config::new()
                .plugins(vec![valid_plugin()])
                .connections_value(ConfigValue::List(vec![ConfigItem::Plugin(valid_plugin())])),
            "All configuration \"connections\" array values must implement ConnectionInterface",
        );
    }

    #[test]
    fn connection_scoped_plugin_declaring_a_non_map() {
        let conn = Arc::new(
            Connection::new("irc.example.net", "ember").plugin(Arc::new(NonMapPlugin)),
        );
        assert_fails(
            Config::new().plugins(vec![valid_plugin()]).connections(vec![conn]),
            "Plugin of class NonMapPlugin has getSubscribedEvents() \
             implementation that does not return an array",
        );
    }

    #[test]
    fn connection_scoped_plugin_declaring_a_blank_event_name() {
        let conn = Arc::new(
            Connection::new("irc.example.net", "ember").plugin(Arc::new(BlankKeyPlugin)),
        );
        assert_fails(
            Config::new().plugins(vec![valid_plugin()]).connections(vec![conn]),
            "Plugin of class BlankKeyPlugin returns non-string event name \
             or invalid callback for event \"\"",
        );
    }

    #[test]
    fn first_violation_wins() {
        // Both keys are malformed; only the plugins rule is reported.
        let config = Config::new()
            .plugins_value(ConfigValue::Other(serde_json::json!(42)))
            .connections_value(ConfigValue::Other(serde_json::json!("foo")));
        assert_fails(
            config,
            "Configuration \"plugins\" key must reference a non-empty array",
        );
    }

    #[test]
    fn global_plugin_contract_is_checked_before_the_connections_key() {
        // No connections key at all, but the plugin violation comes first.
        assert_fails(
            Config::new().plugins(vec![Arc::new(NonMapPlugin)]),
            "Plugin of class NonMapPlugin has getSubscribedEvents() \
             implementation that does not return an array",
        );
    }

    #[test]
    fn valid_configuration_yields_the_topology() {
        let conn = connection();
        let config = Config::new()
            .plugins(vec![valid_plugin(), valid_plugin()])
            .connections(vec![Arc::clone(&conn), connection()]);

        let topology = validate(&config).unwrap();
        assert_eq!(topology.global().len(), 2);
        assert_eq!(topology.connections().len(), 2);
        assert_eq!(topology.connections()[0].connection().id(), conn.id());
        assert_eq!(topology.global()[0].subscriptions().len(), 1);
    }

    #[test]
    fn connection_order_then_plugin_order_for_rule_eight() {
        // First connection is fine, second carries the violating plugin:
        // the error must name the second connection's plugin.
        let good = Arc::new(
            Connection::new("irc.one.net", "ember").plugin(valid_plugin()),
        );
        let bad = Arc::new(
            Connection::new("irc.two.net", "ember")
                .plugin(valid_plugin())
                .plugin(Arc::new(BlankKeyPlugin)),
        );
        assert_fails(
            Config::new().plugins(vec![valid_plugin()]).connections(vec![good, bad]),
            "Plugin of class BlankKeyPlugin returns non-string event name \
             or invalid callback for event \"\"",
        );
    }
}
