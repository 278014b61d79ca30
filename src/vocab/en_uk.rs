//! British English surface syntax, the default language.

pub const LANG_CODE: &str = "en_uk";

pub const VOCABULARY: &str = r#"
[main]
name              = English
code              = en_uk
top_level         = Config, Path, Handler, Pipeline

[config]
name              = Name: {name}
start             = Start: {path} from {service}
service_map       = Map service {service} to {label}

[pipeline]
pattern           = {name}: {data_type}

[path]
name              = Path: {name}

require_else      = Require {path1} else {path2}
require           = Require {path}

wait_sig_enter    = Wait for signal {signal} on timeout {timeout} enter {path}
wait_sig_invoke   = Wait for signal {signal} on timeout {timeout} invoke {service}
wait_sig          = Wait for signal {signal}

wait_sigs_enter   = Wait for signals {signals} on timeout {timeout} enter {path}
wait_sigs_invoke  = Wait for signals {signals} on timeout {timeout} invoke {service}
wait_sigs         = Wait for signals {signals}

enter             = Enter {path}
invoke            = Invoke {service}

fork_to_and_wait  = Fork to {fork_to} under {fork_name} and wait
fork_to           = Fork to {fork_to} under {fork_name}

if_invoke         = If {condition} invoke {service}
if_enter          = If {condition} enter {path}

else_invoke       = Else invoke {service}
else_enter        = Else enter {path}

emit              = Emit {event}
set               = Set {key} = {value}

[handler]
name              = Handler: {name}

ignore_signals    = Ignore signals: {signals}
ignore_signal     = Ignore signal: {signal}

invoke            = Invoke {service}
enter             = Enter {path}
emit              = Emit {event}
set               = Set {key} = {value}
"#;
