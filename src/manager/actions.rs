// src/manager/actions.rs

//! The catalogue of manager actions: thin wrappers that map named parameters
//! onto [`Manager::send_action`]. No control flow beyond parameter assembly.

use super::session::Manager;
use crate::core::AmiError;
use crate::core::protocol::{ActionRequest, Message};

/// Optional fields of an `Originate` action. Exten, Context, and Priority
/// must be given together; Data requires Application.
#[derive(Debug, Clone, Default)]
pub struct OriginateParams {
    pub exten: Option<String>,
    pub context: Option<String>,
    pub priority: Option<String>,
    pub application: Option<String>,
    pub data: Option<String>,
    /// How long to wait for the call to be answered, in milliseconds.
    pub timeout: Option<u64>,
    pub caller_id: Option<String>,
    /// Channel variables to set, one `NAME=value` entry per element.
    pub variables: Vec<String>,
    pub account: Option<String>,
    pub r#async: Option<bool>,
    pub action_id: Option<String>,
}

impl Manager {
    /// Hangs up a channel after `timeout` seconds.
    pub async fn absolute_timeout(
        &mut self,
        channel: &str,
        timeout: u64,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("AbsoluteTimeout")
                .param("Channel", channel)
                .param("Timeout", timeout.to_string()),
        )
        .await
    }

    /// Changes the monitoring filename of a channel.
    pub async fn change_monitor(&mut self, channel: &str, file: &str) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("ChangeMonitor")
                .param("Channel", channel)
                .param("File", file),
        )
        .await
    }

    /// Executes a console command. The output arrives as a `Follows` payload
    /// in the response's `data` field.
    pub async fn command(
        &mut self,
        command: &str,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("Command")
                .param("Command", command)
                .param_opt("ActionID", action_id),
        )
        .await
    }

    /// Enables or disables event delivery for this session. `event_mask` is
    /// `on`, `off`, or a comma-separated category list like `system,call,log`.
    pub async fn events(&mut self, event_mask: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("Events").param("EventMask", event_mask))
            .await
    }

    /// Fetches one key from the peer's internal database. The value arrives
    /// in a follow-up message correlated to the same action id.
    pub async fn db_get(&mut self, family: &str, key: &str) -> Result<Option<String>, AmiError> {
        let action_id = self.next_action_id();
        let res = self
            .send_action(
                ActionRequest::new("DBGet")
                    .param("Family", family)
                    .param("Key", key)
                    .param("ActionID", action_id.clone()),
            )
            .await?;
        if !res.is_success() {
            return Ok(None);
        }
        let follow = self.wait_response(&action_id).await?;
        Ok(follow.get_ignore_case("val").map(str::to_string))
    }

    /// Checks the state of an extension in a context.
    pub async fn extension_state(
        &mut self,
        exten: &str,
        context: &str,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("ExtensionState")
                .param("Exten", exten)
                .param("Context", context)
                .param_opt("ActionID", action_id),
        )
        .await
    }

    /// Reads a channel variable.
    pub async fn get_var(
        &mut self,
        channel: &str,
        variable: &str,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("GetVar")
                .param("Channel", channel)
                .param("Variable", variable)
                .param_opt("ActionID", action_id),
        )
        .await
    }

    /// Hangs up a channel.
    pub async fn hangup(&mut self, channel: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("Hangup").param("Channel", channel))
            .await
    }

    /// Lists IAX peers.
    pub async fn iax_peers(&mut self) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("IAXPeers")).await
    }

    /// Lists the manager actions the peer supports.
    pub async fn list_commands(&mut self, action_id: Option<&str>) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ListCommands").param_opt("ActionID", action_id))
            .await
    }

    /// Logs the session off, awaiting the peer's goodbye response.
    pub async fn logoff(&mut self) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("Logoff")).await
    }

    /// Returns the new/old message counts of a mailbox (`<mailbox>@<vm-context>`).
    pub async fn mailbox_count(
        &mut self,
        mailbox: &str,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("MailboxCount")
                .param("Mailbox", mailbox)
                .param_opt("ActionID", action_id),
        )
        .await
    }

    /// Returns the waiting-message count of a mailbox.
    pub async fn mailbox_status(
        &mut self,
        mailbox: &str,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("MailboxStatus")
                .param("Mailbox", mailbox)
                .param_opt("ActionID", action_id),
        )
        .await
    }

    /// Starts recording a channel. `mix` is only meaningful when `file` is
    /// given and controls whether both legs are mixed into one file.
    pub async fn monitor(
        &mut self,
        channel: &str,
        file: Option<&str>,
        format: Option<&str>,
        mix: bool,
    ) -> Result<Message, AmiError> {
        let mut req = ActionRequest::new("Monitor")
            .param("Channel", channel)
            .param_opt("File", file)
            .param_opt("Format", format);
        if file.is_some() {
            req = req.param("Mix", if mix { "true" } else { "false" });
        }
        self.send_action(req).await
    }

    /// Originates a call on `channel`, connecting it to either an
    /// extension/context/priority triple or an application.
    pub async fn originate(
        &mut self,
        channel: &str,
        params: OriginateParams,
    ) -> Result<Message, AmiError> {
        let mut req = ActionRequest::new("Originate")
            .param("Channel", channel)
            .param_opt("Exten", params.exten)
            .param_opt("Context", params.context)
            .param_opt("Priority", params.priority)
            .param_opt("Application", params.application)
            .param_opt("Data", params.data)
            .param_opt("Timeout", params.timeout.map(|t| t.to_string()))
            .param_opt("CallerID", params.caller_id);
        if !params.variables.is_empty() {
            req = req.param_list("Variable", params.variables);
        }
        req = req
            .param_opt("Account", params.account)
            .param_opt("Async", params.r#async.map(|a| a.to_string()))
            .param_opt("ActionID", params.action_id);
        self.send_action(req).await
    }

    /// Lists parked calls.
    pub async fn parked_calls(&mut self, action_id: Option<&str>) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ParkedCalls").param_opt("ActionID", action_id))
            .await
    }

    /// Keepalive probe.
    pub async fn ping(&mut self) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("Ping")).await
    }

    /// Adds an interface to a queue.
    pub async fn queue_add(
        &mut self,
        queue: &str,
        interface: &str,
        penalty: u32,
        member_name: Option<&str>,
    ) -> Result<Message, AmiError> {
        let mut req = ActionRequest::new("QueueAdd")
            .param("Queue", queue)
            .param("Interface", interface);
        if penalty > 0 {
            req = req.param("Penalty", penalty.to_string());
        }
        req = req.param_opt("MemberName", member_name);
        self.send_action(req).await
    }

    /// Removes an interface from a queue.
    pub async fn queue_remove(&mut self, queue: &str, interface: &str) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("QueueRemove")
                .param("Queue", queue)
                .param("Interface", interface),
        )
        .await
    }

    /// Dumps queue statistics.
    pub async fn queues(&mut self) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("Queues")).await
    }

    /// Queue status, delivered as a list response.
    pub async fn queue_status(&mut self, action_id: Option<&str>) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("QueueStatus").param_opt("ActionID", action_id))
            .await
    }

    /// Redirects a channel (and optionally its peer) to a new destination.
    pub async fn redirect(
        &mut self,
        channel: &str,
        extra_channel: &str,
        exten: &str,
        context: &str,
        priority: &str,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("Redirect")
                .param("Channel", channel)
                .param("ExtraChannel", extra_channel)
                .param("Exten", exten)
                .param("Context", context)
                .param("Priority", priority),
        )
        .await
    }

    /// Sets the CDR user field of a channel.
    pub async fn set_cdr_user_field(
        &mut self,
        user_field: &str,
        channel: &str,
        append: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("SetCDRUserField")
                .param("UserField", user_field)
                .param("Channel", channel)
                .param_opt("Append", append),
        )
        .await
    }

    /// Sets a channel variable.
    pub async fn set_var(
        &mut self,
        channel: &str,
        variable: &str,
        value: &str,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("SetVar")
                .param("Channel", channel)
                .param("Variable", variable)
                .param("Value", value),
        )
        .await
    }

    /// Channel status, delivered as a list response.
    pub async fn status(
        &mut self,
        channel: &str,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("Status")
                .param("Channel", channel)
                .param_opt("ActionID", action_id),
        )
        .await
    }

    /// Stops recording a channel.
    pub async fn stop_monitor(&mut self, channel: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("StopMonitor").param("Channel", channel))
            .await
    }

    /// Dials a number over a Zap channel while offhook.
    pub async fn zap_dial_offhook(
        &mut self,
        zap_channel: &str,
        number: &str,
    ) -> Result<Message, AmiError> {
        self.send_action(
            ActionRequest::new("ZapDialOffhook")
                .param("ZapChannel", zap_channel)
                .param("Number", number),
        )
        .await
    }

    /// Toggles a Zap channel's Do Not Disturb status off.
    pub async fn zap_dnd_off(&mut self, zap_channel: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ZapDNDoff").param("ZapChannel", zap_channel))
            .await
    }

    /// Toggles a Zap channel's Do Not Disturb status on.
    pub async fn zap_dnd_on(&mut self, zap_channel: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ZapDNDon").param("ZapChannel", zap_channel))
            .await
    }

    /// Hangs up a Zap channel.
    pub async fn zap_hangup(&mut self, zap_channel: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ZapHangup").param("ZapChannel", zap_channel))
            .await
    }

    /// Transfers a Zap channel.
    pub async fn zap_transfer(&mut self, zap_channel: &str) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ZapTransfer").param("ZapChannel", zap_channel))
            .await
    }

    /// Lists Zap channels, delivered as a list response.
    pub async fn zap_show_channels(
        &mut self,
        action_id: Option<&str>,
    ) -> Result<Message, AmiError> {
        self.send_action(ActionRequest::new("ZapShowChannels").param_opt("ActionID", action_id))
            .await
    }
}
