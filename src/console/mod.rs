//! Interactive console: the view layer over the API client and the auth
//! shim. Each page command fetches independently and tolerates partial
//! failure; a secondary fetch (comments, attendees) that fails leaves the
//! main resource rendered with an empty section.

pub mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::api::events::EventFilter;
use crate::api::community::PostFilter;
use crate::api::marketplace::ListingFilter;
use crate::api::users::ProfileUpdate;
use crate::api::{Api, PageParams};
use crate::config::Config;
use crate::dates;
use crate::http::ApiClient;
use crate::session::{
    AuthManager, AuthProvider, BackendProvider, IdentityClient, IdentityProvider, OAuthProvider,
    SessionStore,
};

use render::{print_detail, print_table};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

const PAGE_SIZE: u64 = 20;

pub fn run(cfg: Config) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let store = Arc::new(SessionStore::on_disk(cfg.session_file()));
    let client = ApiClient::new(&cfg, store.clone())?;
    let api = Api::new(client);

    let idp = match (&cfg.idp_url, &cfg.idp_key) {
        (Some(url), Some(key)) => Some(Arc::new(IdentityClient::new(url, key, cfg.timeout_secs)?)),
        _ => None,
    };
    let mut providers: Vec<Box<dyn AuthProvider>> = vec![Box::new(BackendProvider::new(api.clone()))];
    if let Some(c) = &idp {
        providers.push(Box::new(IdentityProvider::new(c.clone())));
    }
    let auth = AuthManager::new(providers, store.clone());

    // Announce session transitions from any source, including other
    // processes picked up through refresh()
    store.subscribe(Box::new(|user| match user {
        Some(u) => println!("[session] signed in as {}", u.display_name()),
        None => println!("[session] signed out"),
    }));

    let console = Console { rt, api, auth, idp };
    console.greet();
    console.repl()
}

struct Console {
    rt: tokio::runtime::Runtime,
    api: Api,
    auth: AuthManager,
    idp: Option<Arc<IdentityClient>>,
}

impl Console {
    fn greet(&self) {
        match self.rt.block_on(self.auth.current_user()) {
            Some(u) => println!("Welcome back, {}.", u.display_name()),
            None => println!("Not signed in. Try 'login <email> <password>' or 'signup'."),
        }
    }

    fn repl(&self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        println!("stoop console. Type 'help' for commands.");
        loop {
            let line = match editor.readline("stoop> ") {
                Ok(l) => l,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("input error: {}", e);
                    break;
                }
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(&line);
            if matches!(line.to_lowercase().as_str(), "quit" | "exit") {
                break;
            }
            self.dispatch(&line);
            // Pick up session changes written by other processes
            self.auth.store().refresh();
        }
        Ok(())
    }

    fn dispatch(&self, line: &str) {
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = parts.collect();
        match cmd.as_str() {
            "help" => print_help(),
            "whoami" => self.whoami(),
            "login" => self.login(&args),
            "signup" => self.signup(&args),
            "logout" => self.logout(),
            "forgot" => self.forgot(&args),
            "reset" => self.reset(&args),
            "refresh" => self.refresh_token(),
            "profile" => self.profile(&args),
            "events" => self.events(page_arg(&args)),
            "event" => self.event(&args),
            "register" => self.register(&args),
            "unregister" => self.unregister(&args),
            "community" => self.community(page_arg(&args)),
            "post" => self.post(&args),
            "comment" => self.comment(&args),
            "neighborhoods" => self.neighborhoods(),
            "neighborhood" => self.neighborhood(&args),
            "join" => self.join(&args),
            "leave" => self.leave(&args),
            "market" => self.market(page_arg(&args)),
            "listing" => self.listing(&args),
            "favorite" => self.favorite(&args),
            "threads" => self.threads(page_arg(&args)),
            "thread" => self.thread(&args),
            "notifications" => self.notifications(),
            "messages" => self.messages(),
            "search" => self.search(&args),
            other => eprintln!("unknown command: {} (try 'help')", other),
        }
    }

    // ---- auth commands ----

    fn whoami(&self) {
        match self.rt.block_on(self.auth.current_user()) {
            Some(u) => {
                let expiry = self
                    .auth
                    .store()
                    .token()
                    .and_then(|t| crate::session::store::token_expiry(&t))
                    .map(|dt| dates::format_day_time(Some(&dt.to_rfc3339())))
                    .unwrap_or_default();
                print_detail(&[
                    ("id", u.id.clone()),
                    ("handle", u.display_name().to_string()),
                    ("email", u.email.clone()),
                    ("name", u.full_name.clone().unwrap_or_default()),
                    ("role", format!("{:?}", u.role).to_lowercase()),
                    ("location", u.location.clone().unwrap_or_default()),
                    ("member since", dates::format_day(u.created_at.as_deref())),
                    ("token expires", expiry),
                ]);
            }
            None => println!("not signed in"),
        }
    }

    fn login(&self, args: &[&str]) {
        match args {
            ["--google"] | ["--github"] => {
                let provider = if args[0] == "--google" { OAuthProvider::Google } else { OAuthProvider::Github };
                match &self.idp {
                    Some(idp) => match idp.authorize_url(provider, None) {
                        Ok(url) => println!("Open this URL in a browser to continue:\n  {}", url),
                        Err(e) => eprintln!("error: {}", e),
                    },
                    None => eprintln!("no identity provider configured (set STOOP_IDP_URL / STOOP_IDP_KEY)"),
                }
            }
            [email, password] => match self.rt.block_on(self.auth.sign_in(email, password)) {
                Ok(sess) => println!("signed in as {}", sess.user.display_name()),
                Err(e) => eprintln!("sign-in failed: {}", e),
            },
            _ => eprintln!("usage: login <email> <password> | login --google | login --github"),
        }
    }

    fn signup(&self, args: &[&str]) {
        if args.len() < 2 {
            eprintln!("usage: signup <email> <password> [username] [full name...]");
            return;
        }
        let email = args[0];
        if !EMAIL_RE.is_match(email) {
            eprintln!("that does not look like an email address: {}", email);
            return;
        }
        let password = args[1];
        let username = args.get(2).copied();
        let full_name = if args.len() > 3 { Some(args[3..].join(" ")) } else { None };
        match self
            .rt
            .block_on(self.auth.sign_up(email, password, username, full_name.as_deref()))
        {
            Ok(outcome) => println!("{}", outcome.message),
            Err(e) => eprintln!("sign-up failed: {}", e),
        }
    }

    fn logout(&self) {
        self.rt.block_on(self.auth.sign_out());
    }

    fn forgot(&self, args: &[&str]) {
        match args {
            [email] => match self.rt.block_on(self.auth.forgot_password(email)) {
                Ok(msg) => println!("{}", msg),
                Err(e) => eprintln!("error: {}", e),
            },
            _ => eprintln!("usage: forgot <email>"),
        }
    }

    fn reset(&self, args: &[&str]) {
        match args {
            [password] => match self.rt.block_on(self.auth.reset_password(password, None)) {
                Ok(msg) => println!("{}", msg),
                Err(e) => eprintln!("error: {}", e),
            },
            [password, token] => match self.rt.block_on(self.auth.reset_password(password, Some(*token))) {
                Ok(msg) => println!("{}", msg),
                Err(e) => eprintln!("error: {}", e),
            },
            _ => eprintln!("usage: reset <new-password> [token]"),
        }
    }

    fn refresh_token(&self) {
        match self.rt.block_on(self.auth.refresh_token()) {
            Ok(_) => println!("session refreshed"),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    fn profile(&self, args: &[&str]) {
        let ["set", field, rest @ ..] = args else {
            eprintln!("usage: profile set <username|name|bio|location|website|avatar> <value...>");
            return;
        };
        if rest.is_empty() {
            eprintln!("profile set: missing value");
            return;
        }
        let value = rest.join(" ");
        let mut update = ProfileUpdate::default();
        match *field {
            "username" => update.username = Some(value),
            "name" => update.full_name = Some(value),
            "bio" => update.bio = Some(value),
            "location" => update.location = Some(value),
            "website" => update.website = Some(value),
            "avatar" => update.avatar_url = Some(value),
            other => {
                eprintln!("unknown profile field: {}", other);
                return;
            }
        }
        match self.rt.block_on(self.auth.update_profile(&update)) {
            Ok(user) => println!("profile updated for {}", user.display_name()),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    // ---- events ----

    fn events(&self, page: u64) {
        let filter = EventFilter {
            page: PageParams { page: Some(page), limit: Some(PAGE_SIZE) },
            ..Default::default()
        };
        match self.rt.block_on(self.api.events().list(&filter)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|e| {
                        vec![
                            e.id.clone(),
                            e.title.clone(),
                            dates::format_day_time(e.start_date.as_deref()),
                            e.location.clone().unwrap_or_default(),
                            attendance(e.current_attendees, e.capacity),
                            if e.is_free { "free".into() } else { price(e.price) },
                        ]
                    })
                    .collect();
                print_table(&["ID", "TITLE", "WHEN", "WHERE", "ATTENDING", "PRICE"], &rows);
            }
            Err(e) => eprintln!("failed to load events: {}", e),
        }
    }

    fn event(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: event <id>");
            return;
        };
        let event = match self.rt.block_on(self.api.events().get(id)) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("failed to load event: {}", e);
                return;
            }
        };
        println!("{}", event.title);
        print_detail(&[
            ("when", dates::format_day_time(event.start_date.as_deref())),
            ("where", event.location.clone().unwrap_or_default()),
            ("status", format!("{:?}", event.status).to_uppercase()),
            ("attending", attendance(event.current_attendees, event.capacity)),
            ("waitlist", event.waitlist_count.map(|w| w.to_string()).unwrap_or_default()),
            ("price", if event.is_free { "free".into() } else { price(event.price) }),
            ("host", event.created_by.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default()),
        ]);
        println!("\n{}\n", event.description);

        // Secondary fetches are independent; failure leaves the section empty
        let page = PageParams { page: Some(1), limit: Some(10) };
        match self.rt.block_on(self.api.events().comments(id, &page)) {
            Ok(comments) => {
                println!("comments:");
                if comments.data.is_empty() {
                    println!("  (none)");
                }
                for c in &comments.data {
                    println!(
                        "  {} - {} ({})",
                        c.user.as_ref().map(|u| u.display_name().to_string()).unwrap_or_else(|| c.user_id.clone()),
                        c.content,
                        dates::format_relative(c.created_at.as_deref()),
                    );
                }
            }
            Err(e) => {
                warn!("event comments failed to load: {}", e);
                println!("comments: (unavailable)");
            }
        }
        match self.rt.block_on(self.api.events().attendees(id, &page, None)) {
            Ok(attendees) => {
                let names: Vec<String> = attendees
                    .data
                    .iter()
                    .map(|r| {
                        r.user
                            .as_ref()
                            .map(|u| u.display_name().to_string())
                            .unwrap_or_else(|| r.user_id.clone())
                    })
                    .collect();
                println!("attendees: {}", if names.is_empty() { "(none)".into() } else { names.join(", ") });
            }
            Err(e) => {
                warn!("event attendees failed to load: {}", e);
                println!("attendees: (unavailable)");
            }
        }
    }

    fn register(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: register <event-id>");
            return;
        };
        match self.rt.block_on(self.api.events().register(id, None, None)) {
            Ok(reg) => match reg.waitlist_position {
                Some(pos) => println!("event is full; you are #{} on the waitlist", pos),
                None => println!("registered ({:?})", reg.status),
            },
            Err(e) => eprintln!("registration failed: {}", e),
        }
    }

    fn unregister(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: unregister <event-id>");
            return;
        };
        match self.rt.block_on(self.api.events().unregister(id)) {
            Ok(()) => println!("registration cancelled"),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    // ---- community posts ----

    fn community(&self, page: u64) {
        let filter = PostFilter {
            page: PageParams { page: Some(page), limit: Some(PAGE_SIZE) },
            ..Default::default()
        };
        match self.rt.block_on(self.api.community().list(&filter)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.clone(),
                            p.title.clone(),
                            format!("{:?}", p.category).to_uppercase(),
                            p.author.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default(),
                            p.comment_count.unwrap_or(0).to_string(),
                            dates::format_relative(p.created_at.as_deref()),
                        ]
                    })
                    .collect();
                print_table(&["ID", "TITLE", "CATEGORY", "AUTHOR", "COMMENTS", "POSTED"], &rows);
            }
            Err(e) => eprintln!("failed to load posts: {}", e),
        }
    }

    fn post(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: post <id>");
            return;
        };
        let post = match self.rt.block_on(self.api.community().get(id)) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("failed to load post: {}", e);
                return;
            }
        };
        println!("{} [{}]", post.title, format!("{:?}", post.category).to_uppercase());
        print_detail(&[
            ("author", post.author.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default()),
            ("posted", dates::format_relative(post.created_at.as_deref())),
            ("likes", post.like_count.unwrap_or(0).to_string()),
        ]);
        println!("\n{}\n", post.content);
        let page = PageParams { page: Some(1), limit: Some(20) };
        match self.rt.block_on(self.api.community().comments(id, &page)) {
            Ok(comments) => {
                println!("comments:");
                if comments.data.is_empty() {
                    println!("  (none)");
                }
                for c in &comments.data {
                    let who = c
                        .user
                        .as_ref()
                        .map(|u| u.display_name().to_string())
                        .unwrap_or_else(|| c.user_id.clone());
                    println!("  {} - {}", who, c.content);
                    for r in c.replies.as_deref().unwrap_or(&[]) {
                        let who = r
                            .user
                            .as_ref()
                            .map(|u| u.display_name().to_string())
                            .unwrap_or_else(|| r.user_id.clone());
                        println!("      {} - {}", who, r.content);
                    }
                }
            }
            Err(e) => {
                warn!("comments failed to load: {}", e);
                println!("comments: (unavailable)");
            }
        }
    }

    fn comment(&self, args: &[&str]) {
        if args.len() < 2 {
            eprintln!("usage: comment <post-id> <text...>");
            return;
        }
        let id = args[0];
        let text = args[1..].join(" ");
        match self.rt.block_on(self.api.community().add_comment(id, &text, None)) {
            Ok(_) => println!("comment added"),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    // ---- neighborhoods ----

    fn neighborhoods(&self) {
        match self.rt.block_on(self.api.neighborhoods().list(None, None)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|n| {
                        vec![
                            n.id.clone(),
                            n.name.clone(),
                            n.city.clone(),
                            n.member_count.unwrap_or(0).to_string(),
                            n.event_count.unwrap_or(0).to_string(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "NAME", "CITY", "MEMBERS", "EVENTS"], &rows);
            }
            Err(e) => eprintln!("failed to load neighborhoods: {}", e),
        }
    }

    fn neighborhood(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: neighborhood <id>");
            return;
        };
        let hood = match self.rt.block_on(self.api.neighborhoods().get(id)) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("failed to load neighborhood: {}", e);
                return;
            }
        };
        println!("{} ({})", hood.name, hood.city);
        if let Some(d) = &hood.description {
            println!("{}", d);
        }
        print_detail(&[
            ("members", hood.member_count.unwrap_or(0).to_string()),
            ("events", hood.event_count.unwrap_or(0).to_string()),
            ("listings", hood.listing_count.unwrap_or(0).to_string()),
        ]);
        let page = PageParams { page: Some(1), limit: Some(5) };
        match self.rt.block_on(self.api.neighborhoods().events(id, &page)) {
            Ok(events) => {
                println!("upcoming events:");
                if events.data.is_empty() {
                    println!("  (none)");
                }
                for e in &events.data {
                    println!("  {} - {}", dates::format_day(e.start_date.as_deref()), e.title);
                }
            }
            Err(e) => {
                warn!("neighborhood events failed to load: {}", e);
                println!("upcoming events: (unavailable)");
            }
        }
        match self.rt.block_on(self.api.neighborhoods().posts(id, &page)) {
            Ok(posts) => {
                println!("recent posts:");
                if posts.data.is_empty() {
                    println!("  (none)");
                }
                for p in &posts.data {
                    println!("  {} - {}", p.title, dates::format_relative(p.created_at.as_deref()));
                }
            }
            Err(e) => {
                warn!("neighborhood posts failed to load: {}", e);
                println!("recent posts: (unavailable)");
            }
        }
    }

    fn join(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: join <neighborhood-id>");
            return;
        };
        match self.rt.block_on(self.api.neighborhoods().join(id)) {
            Ok(()) => println!("joined"),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    fn leave(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: leave <neighborhood-id>");
            return;
        };
        match self.rt.block_on(self.api.neighborhoods().leave(id)) {
            Ok(()) => println!("left"),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    // ---- marketplace ----

    fn market(&self, page: u64) {
        let filter = ListingFilter {
            page: PageParams { page: Some(page), limit: Some(PAGE_SIZE) },
            ..Default::default()
        };
        match self.rt.block_on(self.api.marketplace().listings(&filter)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|l| {
                        vec![
                            l.id.clone(),
                            l.title.clone(),
                            price(Some(l.price)),
                            l.condition.clone().unwrap_or_default(),
                            l.status.clone().unwrap_or_default(),
                            l.seller.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "TITLE", "PRICE", "CONDITION", "STATUS", "SELLER"], &rows);
            }
            Err(e) => eprintln!("failed to load listings: {}", e),
        }
    }

    fn listing(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: listing <id>");
            return;
        };
        match self.rt.block_on(self.api.marketplace().get(id)) {
            Ok(l) => {
                println!("{}", l.title);
                print_detail(&[
                    ("price", price(Some(l.price))),
                    ("condition", l.condition.clone().unwrap_or_default()),
                    ("status", l.status.clone().unwrap_or_default()),
                    ("where", l.location.clone().unwrap_or_default()),
                    ("seller", l.seller.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default()),
                    ("listed", dates::format_relative(l.created_at.as_deref())),
                ]);
                println!("\n{}", l.description);
            }
            Err(e) => eprintln!("failed to load listing: {}", e),
        }
    }

    fn favorite(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: favorite <listing-id>");
            return;
        };
        match self.rt.block_on(self.api.marketplace().toggle_favorite(id)) {
            Ok(()) => println!("favorite toggled"),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    // ---- forum ----

    fn threads(&self, page: u64) {
        let p = PageParams { page: Some(page), limit: Some(PAGE_SIZE) };
        match self.rt.block_on(self.api.forum().threads(&p, None, None, None)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|t| {
                        vec![
                            t.id.clone(),
                            t.title.clone(),
                            t.author.as_ref().map(|u| u.display_name().to_string()).unwrap_or_default(),
                            t.post_count.to_string(),
                            dates::format_relative(t.last_post_at.as_deref()),
                        ]
                    })
                    .collect();
                print_table(&["ID", "TITLE", "AUTHOR", "REPLIES", "LAST POST"], &rows);
            }
            Err(e) => eprintln!("failed to load threads: {}", e),
        }
    }

    fn thread(&self, args: &[&str]) {
        let [id] = args else {
            eprintln!("usage: thread <id>");
            return;
        };
        let thread = match self.rt.block_on(self.api.forum().thread(id)) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("failed to load thread: {}", e);
                return;
            }
        };
        println!("{}", thread.title);
        println!("{}\n", thread.content);
        let page = PageParams { page: Some(1), limit: Some(20) };
        match self.rt.block_on(self.api.forum().posts(id, &page)) {
            Ok(posts) => {
                for p in &posts.data {
                    let who = p
                        .author
                        .as_ref()
                        .map(|u| u.display_name().to_string())
                        .unwrap_or_else(|| p.author_id.clone());
                    let marker = if p.is_answer.unwrap_or(false) { " [answer]" } else { "" };
                    println!("  {}{} - {}", who, marker, p.content);
                }
            }
            Err(e) => {
                warn!("thread replies failed to load: {}", e);
                println!("replies: (unavailable)");
            }
        }
    }

    // ---- notifications, messages, search ----

    fn notifications(&self) {
        let page = PageParams { page: Some(1), limit: Some(PAGE_SIZE) };
        match self.rt.block_on(self.api.notifications().list(&page, false)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|n| {
                        vec![
                            if n.read { " ".into() } else { "*".into() },
                            n.title.clone(),
                            n.message.clone(),
                            dates::format_relative(n.created_at.as_deref()),
                        ]
                    })
                    .collect();
                print_table(&["", "TITLE", "MESSAGE", "WHEN"], &rows);
            }
            Err(e) => eprintln!("failed to load notifications: {}", e),
        }
    }

    fn messages(&self) {
        let page = PageParams { page: Some(1), limit: Some(PAGE_SIZE) };
        match self.rt.block_on(self.api.messages().conversations(&page)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|c| {
                        let with = c
                            .participants
                            .iter()
                            .map(|u| u.display_name().to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        vec![
                            c.id.clone(),
                            with,
                            c.last_message.as_ref().map(|m| m.content.clone()).unwrap_or_default(),
                            c.unread_count.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "WITH", "LAST MESSAGE", "UNREAD"], &rows);
            }
            Err(e) => eprintln!("failed to load conversations: {}", e),
        }
    }

    fn search(&self, args: &[&str]) {
        if args.is_empty() {
            eprintln!("usage: search <query...>");
            return;
        }
        let q = args.join(" ");
        let page = PageParams { page: Some(1), limit: Some(PAGE_SIZE) };
        match self.rt.block_on(self.api.search().search(&q, None, &page)) {
            Ok(result) => {
                let rows: Vec<Vec<String>> = result
                    .data
                    .iter()
                    .map(|r| {
                        vec![
                            r.kind.clone(),
                            r.id.clone(),
                            r.title.clone().unwrap_or_else(|| snippet(&r.content)),
                        ]
                    })
                    .collect();
                print_table(&["TYPE", "ID", "MATCH"], &rows);
            }
            Err(e) => eprintln!("search failed: {}", e),
        }
    }
}

fn page_arg(args: &[&str]) -> u64 {
    args.first().and_then(|s| s.parse().ok()).unwrap_or(1)
}

fn attendance(current: Option<u64>, capacity: Option<u64>) -> String {
    match (current, capacity) {
        (Some(c), Some(cap)) => format!("{}/{}", c, cap),
        (Some(c), None) => c.to_string(),
        _ => String::new(),
    }
}

fn price(p: Option<f64>) -> String {
    match p {
        Some(v) if v > 0.0 => format!("${:.2}", v),
        _ => "free".into(),
    }
}

fn snippet(s: &str) -> String {
    let mut out: String = s.chars().take(60).collect();
    if s.chars().count() > 60 {
        out.push('…');
    }
    out
}

fn print_help() {
    println!(
        "Commands:\n  login <email> <password>      sign in (backend first, identity fallback)\n  login --google | --github     print an OAuth sign-in URL\n  signup <email> <password> [username] [full name]\n  logout                        sign out everywhere\n  whoami                        show the current user\n  forgot <email>                send a password reset email\n  reset <new-password> [token]  set a new password\n  refresh                       refresh the session token\n  profile set <field> <value>   update username/name/bio/location/website/avatar\n\n  events [page] | event <id> | register <id> | unregister <id>\n  community [page] | post <id> | comment <id> <text>\n  neighborhoods | neighborhood <id> | join <id> | leave <id>\n  market [page] | listing <id> | favorite <id>\n  threads [page] | thread <id>\n  notifications | messages | search <query>\n  quit | exit"
    );
}
