//! The LACON source format.
//!
//! This module only holds documentation. Every example is a doctest run
//! against the parser.
//!
//! # Keys and values
//!
//! A line is `key value`, `key = value` or `key=value`. A key on its own is
//! a flag set to `true`. Keys are made of letters, digits, `.`, `_` and `-`.
//!
//! | Written | Parsed as |
//! |---------|-----------|
//! | `true` / `false` | boolean |
//! | `42`, `-7`, `2.5` | number (`2.0` becomes the integer `2`) |
//! | `"text"` | string, escapes decoded |
//! | `text with spaces` | string, everything after the key |
//! | `[1, two, "3"]` | array |
//! | `{a=1 b=2}` | object |
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let doc = parse_str("debug\nname = demo app\nport=8080\nratio 0.75\ntags [web, \"api\"]").unwrap();
//! assert_eq!(doc, lacon!({
//!     "debug": true,
//!     "name": "demo app",
//!     "port": 8080,
//!     "ratio": 0.75,
//!     "tags": ["web", "api"]
//! }));
//! ```
//!
//! Several pairs may share a line. Text before the first `key=` names an
//! object that receives them:
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let doc = parse_str("server host=localhost port=80").unwrap();
//! assert_eq!(doc, lacon!({ "server": { "host": "localhost", "port": 80 } }));
//! ```
//!
//! # Nesting
//!
//! Objects nest by indentation or by braces, and the two styles mix freely.
//! `a > b` walks a key path and `a > b {` opens a block at the end of it.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let text = "\
//! server
//!   port 80
//!   tls {
//!     enabled
//!   }
//! limits > cpu 2
//! ";
//! assert_eq!(parse_str(text).unwrap(), lacon!({
//!     "server": { "port": 80, "tls": { "enabled": true } },
//!     "limits": { "cpu": 2 }
//! }));
//! ```
//!
//! # Appending and multiple keys
//!
//! `key + value` pushes onto an array and joins other scalars with a
//! newline. `[a, b] = [1, 2]` assigns element-wise, `[a, b] = 0` assigns the
//! same value to both.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let doc = parse_str("hosts []\nhosts + a\nhosts + b\n[x, y] = [1, 2]").unwrap();
//! assert_eq!(doc, lacon!({ "hosts": ["a", "b"], "x": 1, "y": 2 }));
//! ```
//!
//! # Multiline strings and arrays
//!
//! `key (` collects one fragment per line until `)`; `key @(` keeps the
//! lines verbatim minus their common indentation. `key [` collects array
//! items until `]`.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let text = "\
//! motd (
//!   \"Welcome\"
//!   \"Have fun\"
//! )
//! ports [
//!   80,
//!   443
//! ]
//! ";
//! assert_eq!(parse_str(text).unwrap(), lacon!({
//!     "motd": "Welcome\nHave fun",
//!     "ports": [80, 443]
//! }));
//! ```
//!
//! # Comments and escapes
//!
//! `//` starts a comment outside quotes and `/* ... */` spans lines. Quoted
//! strings understand `\n \r \t \b \f \" \\ \$ \~` and `\u{HEX}`.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let text = "a 1 // one\n/*\nb 2\n*/\nc \"smile \\u{263A}\"";
//! assert_eq!(parse_str(text).unwrap(), lacon!({ "a": 1, "c": "smile \u{263A}" }));
//! ```
//!
//! # Variables
//!
//! `$name value` or `$name = value` declares a variable; `$name` later on is
//! replaced by its text. `~` ends a name explicitly and `\$` keeps a literal
//! dollar sign. Unknown names are left alone.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let doc = parse_str("$env prod\nhost $env~-db.local\nprice \\$5\nother $unknown").unwrap();
//! assert_eq!(doc, lacon!({ "host": "prod-db.local", "price": "$5", "other": "$unknown" }));
//! ```
//!
//! # Format calls
//!
//! `@f(FORMAT, ARG)` renders a number through `{}` or
//! `{:[0][WIDTH][x|X][(OFFSET)]}` placeholders.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let doc = parse_str("id @f(\"{:04X}\", 255)\nnext @f({:(1)}, 41)").unwrap();
//! assert_eq!(doc, lacon!({ "id": "00FF", "next": 42 }));
//! ```
//!
//! # Emit directives
//!
//! `<emit: START to +COUNT [as local $VAR[=EXPR]]>` repeats the rest of the
//! line, or the `{ ... }` block that follows, once per counter value.
//! `-COUNT` counts down, and a `0x` start renders the counter as 4-digit hex.
//!
//! ```rust
//! use lacon::{lacon, parse_str};
//!
//! let text = "\
//! <emit: 1 to +2 as local $i>
//! worker_$i {
//!   port 900$i
//! }
//! ";
//! assert_eq!(parse_str(text).unwrap(), lacon!({
//!     "worker_1": { "port": 9001 },
//!     "worker_2": { "port": 9002 }
//! }));
//! ```
//!
//! # Imports
//!
//! `@import file.lacon` merges another document into the current object and
//! `key @import=file.lacon` stores it under `key`. Paths are relative to the
//! importing file. Importing a file that is already being parsed fails with
//! [`Error::CircularImport`](crate::Error::CircularImport).
