//! Subcommand handlers. Each opens the data directory, runs one operation
//! against the roster book and prints plain text.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDate};

use rosterbook_core::calendar;
use rosterbook_core::participation::monthly_event_counts;
use rosterbook_core::utils::{cmp_ignore_case, truncate_string};
use rosterbook_core::{
    Config, DateRange, Event, EventType, JsonRepository, Member, MemberDirectory, MemberId, Role,
    RosterBook, YearMonth,
};

use crate::Commands;

/// Width of name columns in list output
const NAME_WIDTH: usize = 24;

/// Placeholder for an unfilled role
const OPEN_SLOT: &str = "(open)";

pub struct Context {
    config: Config,
    data_dir: PathBuf,
}

impl Context {
    pub fn new(config: Config, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }

    fn repository(&self) -> Result<JsonRepository> {
        JsonRepository::open(self.data_dir.clone())
    }

    fn open_book(&self) -> Result<RosterBook<JsonRepository>> {
        let repository = self.repository()?;
        let members = repository.load_members()?;
        Ok(RosterBook::open(members, repository)?)
    }
}

pub(crate) fn dispatch(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Events { month } => events(ctx, month),
        Commands::Members {
            search,
            role,
            active,
        } => members(ctx, search.as_deref(), role, active),
        Commands::ImportMembers { file } => import_members(ctx, &file),
        Commands::Block { member, date } => block(ctx, MemberId::from(member), date),
        Commands::Blocked { member, date } => blocked(ctx, member.map(MemberId::from), date),
        Commands::Assign {
            date,
            event,
            role,
            member,
        } => assign(ctx, date, event, role, MemberId::from(member)),
        Commands::Unassign { date, event, role } => unassign(ctx, date, event, role),
        Commands::Reassign {
            date,
            event,
            role,
            member,
        } => reassign(ctx, date, event, role, MemberId::from(member)),
        Commands::Roster { date, event } => roster(ctx, date, event),
        Commands::OpenSlots { month } => open_slots(ctx, month),
        Commands::Candidates { date, event, role } => candidates(ctx, date, event, role),
        Commands::Report {
            from,
            to,
            event,
            member,
        } => report(ctx, from, to, event, member.map(MemberId::from)),
        Commands::Summary { month } => summary(ctx, month),
    }
}

fn event_heading(event: &Event) -> String {
    format!("{} - {}", event.title(), event.formatted_date())
}

// ===== Calendar =====

fn events(ctx: &Context, month: YearMonth) -> Result<()> {
    let book = ctx.open_book()?;
    println!("{} - {}", ctx.config.ministry_display(), month.label());
    for event in calendar::events_in_month(month) {
        let filled = book.list_assignments(&event).len();
        let needed = event.required_roles().len();
        println!(
            "  {:<18} {:<24} {}/{}{}",
            event.formatted_date(),
            event.title(),
            filled,
            needed,
            if filled == needed { "  staffed" } else { "" }
        );
    }
    Ok(())
}

// ===== Members =====

fn members(ctx: &Context, search: Option<&str>, role: Option<Role>, active: bool) -> Result<()> {
    let list = ctx.repository()?.load_members()?;
    let mut shown: Vec<&Member> = match search {
        Some(query) => list.search(query),
        None => list.sorted_by_name(),
    };
    if let Some(role) = role {
        shown.retain(|m| m.is_qualified(role));
    }
    if active {
        shown.retain(|m| m.active);
    }

    if shown.is_empty() {
        println!("No members found.");
        return Ok(());
    }
    for member in shown {
        println!(
            "  {:<8} {:<24} {:<16} {}{}",
            member.id,
            truncate_string(&member.name, NAME_WIDTH),
            member.formatted_phone().unwrap_or_default(),
            member.roles_display(),
            if member.active { "" } else { "  (inactive)" }
        );
    }
    Ok(())
}

fn import_members(ctx: &Context, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read member file: {}", file.display()))?;
    let incoming: Vec<Member> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse member file: {}", file.display()))?;

    let repository = ctx.repository()?;
    let mut list = repository.load_members()?;
    let count = incoming.len();
    for member in incoming {
        list.upsert(member);
    }
    repository.save_members(list.members())?;
    println!("Imported {} members ({} total).", count, list.len());
    Ok(())
}

// ===== Availability =====

fn block(ctx: &Context, member: MemberId, date: NaiveDate) -> Result<()> {
    let mut book = ctx.open_book()?;
    if book.directory().member(&member).is_none() {
        println!("Note: {} is not in the member list.", member);
    }
    let name = book.directory().display_name(&member);
    if book.toggle_block(&member, date)? {
        println!("{} is now unavailable on {}.", name, date);
    } else {
        println!("{} is available again on {}.", name, date);
    }
    Ok(())
}

fn blocked(ctx: &Context, member: Option<MemberId>, date: Option<NaiveDate>) -> Result<()> {
    let book = ctx.open_book()?;
    if let Some(member) = member {
        let dates = book.list_blocked(&member);
        let name = book.directory().display_name(&member);
        if dates.is_empty() {
            println!("{} has no blocked dates.", name);
        } else {
            println!("{} is unavailable on:", name);
            for date in dates {
                println!("  {}", date.format("%a, %b %d, %Y"));
            }
        }
    }
    if let Some(date) = date {
        let out = book.availability().blocked_members_on(date);
        if out.is_empty() {
            println!("Everyone is available on {}.", date);
        } else {
            println!("Unavailable on {}:", date);
            for member in out {
                println!("  {}", book.directory().display_name(&member));
            }
        }
    }
    Ok(())
}

// ===== Roster =====

fn assign(ctx: &Context, date: NaiveDate, event_type: EventType, role: Role, member: MemberId) -> Result<()> {
    let mut book = ctx.open_book()?;
    let event = book.event(date, event_type)?;
    book.assign(&event, role, &member)?;
    println!(
        "Assigned {} as {} for {}.",
        book.directory().display_name(&member),
        role,
        event_heading(&event)
    );
    Ok(())
}

fn unassign(ctx: &Context, date: NaiveDate, event_type: EventType, role: Role) -> Result<()> {
    let mut book = ctx.open_book()?;
    let event = book.event(date, event_type)?;
    let removed = book.unassign(&event, role)?;
    println!(
        "Removed {} from {} for {}.",
        book.directory().display_name(&removed.member_id),
        role,
        event_heading(&event)
    );
    Ok(())
}

fn reassign(ctx: &Context, date: NaiveDate, event_type: EventType, role: Role, member: MemberId) -> Result<()> {
    let mut book = ctx.open_book()?;
    let event = book.event(date, event_type)?;
    let change = book.reassign(&event, role, &member)?;
    let name = book.directory().display_name(&member);
    match change.previous {
        Some(previous) => println!(
            "{} replaces {} as {} for {}.",
            name,
            book.directory().display_name(&previous.member_id),
            role,
            event_heading(&event)
        ),
        None => println!("Assigned {} as {} for {}.", name, role, event_heading(&event)),
    }
    Ok(())
}

fn roster(ctx: &Context, date: NaiveDate, event_type: EventType) -> Result<()> {
    let book = ctx.open_book()?;
    let event = book.event(date, event_type)?;
    println!("{}", event_heading(&event));
    for role in event.required_roles() {
        let holder = book
            .roster()
            .assignment(&event, *role)
            .map(|a| book.directory().display_name(&a.member_id))
            .unwrap_or_else(|| OPEN_SLOT.to_string());
        println!("  {:<16} {}", role.label(), holder);
    }
    if book.is_fully_staffed(&event) {
        println!("Fully staffed.");
    }
    Ok(())
}

fn open_slots(ctx: &Context, month: YearMonth) -> Result<()> {
    let book = ctx.open_book()?;
    let open = book.unstaffed_events(month);
    if open.is_empty() {
        println!("Every service in {} is staffed.", month.label());
        return Ok(());
    }
    for slots in open {
        let roles: Vec<&str> = slots.roles.iter().map(|r| r.label()).collect();
        println!(
            "  {:<18} {:<24} {}",
            slots.event.formatted_date(),
            slots.event.title(),
            roles.join(", ")
        );
    }
    Ok(())
}

fn candidates(ctx: &Context, date: NaiveDate, event_type: EventType, role: Role) -> Result<()> {
    let book = ctx.open_book()?;
    let event = book.event(date, event_type)?;
    if let Some(current) = book.roster().assignment(&event, role) {
        println!(
            "{} is currently held by {}.",
            role,
            book.directory().display_name(&current.member_id)
        );
    }
    let eligible = book.eligible_members(&event, role);
    if eligible.is_empty() {
        println!("Nobody is available for {} on {}.", role, event_heading(&event));
        return Ok(());
    }
    println!("Available for {} on {}:", role, event_heading(&event));
    for member in eligible {
        println!("  {:<8} {}", member.id, truncate_string(&member.name, NAME_WIDTH));
    }
    Ok(())
}

// ===== Reports =====

fn report(
    ctx: &Context,
    from: NaiveDate,
    to: NaiveDate,
    event_type: Option<EventType>,
    member: Option<MemberId>,
) -> Result<()> {
    let book = ctx.open_book()?;
    let range = DateRange::new(from, to)?;
    println!("{} - participation {} to {}", ctx.config.ministry_display(), from, to);

    if let Some(member) = member {
        let record = book.member_participation(&member, range);
        println!("  {}: {} services", record.name, record.total);
        for event_type in EventType::ALL {
            println!("    {:<24} {}", event_type.title(), record.count_for(event_type));
        }
        return Ok(());
    }

    let mut rows: Vec<(String, usize)> = match event_type {
        Some(event_type) => book
            .aggregate(range, Some(event_type))
            .into_iter()
            .map(|(id, count)| (book.directory().display_name(&id), count))
            .collect(),
        None => book
            .participation_table(range)
            .into_iter()
            .map(|record| (record.name, record.total))
            .collect(),
    };
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| cmp_ignore_case(&a.0, &b.0)));

    if rows.is_empty() {
        println!("  No assignments in this range.");
    }
    for (name, count) in &rows {
        println!("  {:<24} {}", truncate_string(name, NAME_WIDTH), count);
    }

    if event_type.is_none() {
        if let Some(top) = book.top_participant(range) {
            println!("Most active: {} ({} services)", top.name, top.total);
        }
    }

    println!("Services per month:");
    for count in monthly_event_counts(YearMonth::of(from)?, YearMonth::of(to)?) {
        println!("  {:<16} {}", count.month.label(), count.events);
    }
    Ok(())
}

fn summary(ctx: &Context, month: YearMonth) -> Result<()> {
    let book = ctx.open_book()?;
    let summary = book.month_summary(month);
    println!("{} - {}", ctx.config.ministry_display(), month.label());
    println!(
        "  Members:   {} ({} active)",
        summary.total_members, summary.active_members
    );
    println!("  Services:  {} ({})", summary.events, summary.services_display());
    println!(
        "  Staffed:   {}/{} ({}%), {} open slots",
        summary.staffed_events, summary.events, summary.staffing_percent, summary.open_slots
    );
    println!(
        "  Serving:   {}% of active members",
        summary.participation_percent
    );

    if let Some(next) = calendar::next_event(Local::now().date_naive()) {
        let open = book.open_roles(&next).len();
        println!(
            "  Next:      {}{}",
            event_heading(&next),
            if open == 0 {
                String::new()
            } else {
                format!(" ({} open)", open)
            }
        );
    }
    let ages = book.repository().file_ages();
    println!(
        "  Updated:   {} (members {})",
        ages.last_updated(),
        ages.members_display()
    );
    Ok(())
}
