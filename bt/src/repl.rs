//! Interactive planning session

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use tripstore::{SavedTrip, TripStore, UserStore};

use crate::domain::QuizQuestion;
use crate::session::SessionController;

/// Interactive planning REPL
pub struct ReplSession {
    controller: SessionController,
    trips: TripStore,
    users: UserStore,
    last_removed: Option<tripstore::ItineraryItem>,
    hands_free: bool,
}

impl ReplSession {
    pub fn new(controller: SessionController, trips: TripStore, users: UserStore) -> Self {
        Self {
            controller,
            trips,
            users,
            last_removed: None,
            hands_free: false,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_city: Option<String>, initial_hotel: Option<String>, hands_free: bool) -> Result<()> {
        self.hands_free = hands_free;
        self.print_welcome();

        if let Some(city) = initial_city {
            println!("{} {}", ">".bright_green(), city);
            self.start_city(&city, initial_hotel.as_deref().unwrap_or("")).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        // A bare line starts a new session for that city.
                        self.start_city(input, "").await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        // The draft must reflect the latest state even if the debounce
        // window has not elapsed.
        self.controller.flush_draft().await;
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "BrainTrip Planner".bright_cyan().bold());
        println!("Type a city name to start planning, {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        if let Ok(Some(user)) = self.users.current() {
            println!("Signed in as {}", user.name.bright_white());
        }
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let rest = input[cmd.len()..].trim();

        match cmd {
            "/help" | "/h" => {
                self.print_help();
            }
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/show" => {
                self.print_session();
            }
            "/quiz" => {
                self.print_quiz();
            }
            "/answer" | "/a" => {
                self.answer_question(&parts[1..]);
            }
            "/suggest" | "/s" => {
                self.fetch_suggestions().await;
            }
            "/add" => {
                self.add_suggestion(&parts[1..]);
            }
            "/remove" | "/rm" => {
                self.remove_item(&parts[1..]);
            }
            "/undo" => {
                self.undo_remove();
            }
            "/done" => {
                self.toggle_done(&parts[1..]);
            }
            "/note" => {
                self.note_item(&parts[1..], rest);
            }
            "/notes" => {
                self.controller.update_trip_notes(rest);
                println!("{}", "Trip notes updated.".dimmed());
            }
            "/route" => {
                self.optimize_route().await;
            }
            "/save" => {
                if self.controller.save_session() {
                    println!("{}", "Trip saved.".green());
                } else {
                    println!("{}", "Nothing to save.".dimmed());
                }
            }
            "/share" => {
                self.share_trip();
            }
            "/trips" => {
                self.print_trips();
            }
            "/load" => {
                self.load_trip(&parts[1..]);
            }
            "/delete" => {
                self.delete_trip(&parts[1..]);
            }
            "/resume" => {
                if self.controller.resume_draft() {
                    println!("Resumed draft for {}", self.controller.city().bright_white());
                    self.print_session();
                } else {
                    println!("{}", "No draft to resume.".dimmed());
                }
            }
            "/signup" => {
                self.sign_up(&parts[1..]);
            }
            "/login" => {
                self.log_in(&parts[1..]);
            }
            "/logout" => match self.users.log_out() {
                Ok(()) => println!("{}", "Logged out.".dimmed()),
                Err(e) => println!("{} {}", "Error:".red(), e),
            },
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }

        SlashResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:22} Start planning (merges into an existing trip for that city)", "<city name>".yellow());
        println!("  {:22} Show the current itinerary", "/show".yellow());
        println!("  {:22} Show the quiz again", "/quiz".yellow());
        println!("  {:22} Answer quiz question N with option M", "/answer <n> <m>".yellow());
        println!("  {:22} Fetch place suggestions from the quiz topics", "/suggest".yellow());
        println!("  {:22} Add suggestion N to the itinerary", "/add <n>".yellow());
        println!("  {:22} Remove itinerary item N", "/remove <n>".yellow());
        println!("  {:22} Restore the last removed item", "/undo".yellow());
        println!("  {:22} Toggle itinerary item N completed", "/done <n>".yellow());
        println!("  {:22} Set notes on itinerary item N", "/note <n> <text>".yellow());
        println!("  {:22} Set trip-level notes", "/notes <text>".yellow());
        println!("  {:22} Ask for an efficient visiting order", "/route".yellow());
        println!("  {:22} Save the current trip", "/save".yellow());
        println!("  {:22} Print a shareable trip summary", "/share".yellow());
        println!("  {:22} List saved trips", "/trips".yellow());
        println!("  {:22} Load saved trip N", "/load <n>".yellow());
        println!("  {:22} Delete saved trip N", "/delete <n>".yellow());
        println!("  {:22} Resume the autosaved draft", "/resume".yellow());
        println!("  {:22} Create an account", "/signup <name> <email> <password>".yellow());
        println!("  {:22} Sign in", "/login <email> <password>".yellow());
        println!("  {:22} Sign out", "/logout".yellow());
        println!("  {:22} Exit", "/quit".yellow());
        println!();
    }

    async fn start_city(&mut self, city: &str, hotel: &str) {
        if city.trim().is_empty() {
            println!("{}", "Please enter a city name.".yellow());
            return;
        }

        println!("{}", format!("Generating a quiz about {}...", city.trim()).dimmed());
        match self.controller.start_session(city, self.hands_free, hotel).await {
            Ok(()) => {
                if self.controller.bound_trip_id().is_some() {
                    println!(
                        "Found a saved trip for {} with {} item(s). Picking up where you left off.",
                        self.controller.city().bright_white(),
                        self.controller.itinerary().len()
                    );
                }
                self.print_quiz();
                // Hands-free sessions skip the explicit /suggest step.
                if self.controller.hands_free() {
                    self.fetch_suggestions().await;
                }
            }
            Err(e) => {
                println!("{} {}", "Generation failed:".red(), e);
                println!("{}", "Your session is unchanged. Try again in a moment.".dimmed());
            }
        }
    }

    fn print_quiz(&self) {
        let quiz = self.controller.quiz();
        if quiz.is_empty() {
            println!("{}", "No quiz yet. Type a city name to start.".dimmed());
            return;
        }

        println!();
        println!("{}", format!("Quiz: {}", self.controller.city()).bright_cyan().bold());
        for (i, question) in quiz.iter().enumerate() {
            print_question(i, question);
        }
        println!("Answer with {}, then {} for places to visit", "/answer <n> <m>".yellow(), "/suggest".yellow());
        println!();
    }

    fn answer_question(&self, args: &[&str]) {
        let quiz = self.controller.quiz();
        let (Some(q), Some(m)) = (parse_index(args.first(), quiz.len()), args.get(1).and_then(|s| s.parse::<usize>().ok()))
        else {
            println!("Usage: {}", "/answer <question> <option>".yellow());
            return;
        };
        let question = &quiz[q];
        if m == 0 || m > question.options.len() {
            println!("Pick an option between 1 and {}", question.options.len());
            return;
        }

        if question.is_correct(m - 1) {
            println!("{} {}", "Correct!".green().bold(), question.fun_fact.dimmed());
        } else {
            let right = &question.options[question.correct_index.min(question.options.len() - 1)];
            println!("{} The answer was {}. {}", "Not quite.".red(), right.bright_white(), question.fun_fact.dimmed());
        }
    }

    async fn fetch_suggestions(&mut self) {
        if self.controller.city().is_empty() {
            println!("{}", "Start with a city name first.".dimmed());
            return;
        }

        println!("{}", "Finding places to visit...".dimmed());
        if let Err(e) = self.controller.fetch_suggestions().await {
            println!("{} {}", "Generation failed:".red(), e);
            return;
        }

        // Best-effort image enrichment, one attempt per suggestion.
        let ids: Vec<String> = self.controller.suggestions().iter().map(|p| p.id.clone()).collect();
        for id in ids {
            if let Some(ticket) = self.controller.enrichment_ticket(&id) {
                if let Some(url) = self.controller.fetch_enrichment(&ticket).await {
                    self.controller.apply_enrichment(&ticket, url);
                }
            }
        }

        println!();
        println!("{}", "Suggestions:".bright_cyan().bold());
        for (i, poi) in self.controller.suggestions().iter().enumerate() {
            let distance = poi.distance_text.as_deref().unwrap_or("?");
            let travel = poi.travel_time_text.as_deref().unwrap_or("?");
            println!(
                "  {}. {} [{}] {} away, {} by foot",
                i + 1,
                poi.title.bright_white(),
                poi.category,
                distance,
                travel
            );
            println!("     {}", poi.description.dimmed());
            if let Some(url) = &poi.image_url {
                println!("     {}", url.blue());
            }
        }
        println!("Add one with {}", "/add <n>".yellow());
        println!();
    }

    fn add_suggestion(&mut self, args: &[&str]) {
        let Some(i) = parse_index(args.first(), self.controller.suggestions().len()) else {
            println!("Usage: {}", "/add <n>".yellow());
            return;
        };
        let poi = self.controller.suggestions()[i].clone();
        let title = poi.title.clone();
        self.controller.add_item(poi);
        println!("Added {} to your itinerary.", title.bright_white());
    }

    fn remove_item(&mut self, args: &[&str]) {
        let Some(i) = parse_index(args.first(), self.controller.itinerary().len()) else {
            println!("Usage: {}", "/remove <n>".yellow());
            return;
        };
        let id = self.controller.itinerary()[i].id().to_string();
        if let Some(removed) = self.controller.remove_item(&id) {
            println!("Removed {}. Use {} to restore it.", removed.title().bright_white(), "/undo".yellow());
            self.last_removed = Some(removed);
        }
    }

    fn undo_remove(&mut self) {
        match self.last_removed.take() {
            Some(item) => {
                println!("Restored {} at the end of the itinerary.", item.title().bright_white());
                self.controller.restore_item(item);
            }
            None => println!("{}", "Nothing to undo.".dimmed()),
        }
    }

    fn toggle_done(&mut self, args: &[&str]) {
        let Some(i) = parse_index(args.first(), self.controller.itinerary().len()) else {
            println!("Usage: {}", "/done <n>".yellow());
            return;
        };
        let item = &self.controller.itinerary()[i];
        let id = item.id().to_string();
        let next = !item.completed;
        self.controller.update_item(&id, crate::itinerary::ItemUpdate::completed(next));
        println!("{}", if next { "Marked done.".green() } else { "Marked not done.".dimmed() });
    }

    fn note_item(&mut self, args: &[&str], rest: &str) {
        let Some(i) = parse_index(args.first(), self.controller.itinerary().len()) else {
            println!("Usage: {}", "/note <n> <text>".yellow());
            return;
        };
        let id = self.controller.itinerary()[i].id().to_string();
        let text = rest.splitn(2, ' ').nth(1).unwrap_or("").trim();
        self.controller.update_item(&id, crate::itinerary::ItemUpdate::notes(text));
        println!("{}", "Note saved.".dimmed());
    }

    async fn optimize_route(&mut self) {
        if self.controller.itinerary().len() < 2 {
            println!("{}", "Add at least two places first.".dimmed());
            return;
        }
        println!("{}", "Working out the best order...".dimmed());
        match self.controller.optimize_route().await {
            Ok(()) => self.print_session(),
            Err(e) => println!("{} {}", "Generation failed:".red(), e),
        }
    }

    fn print_session(&self) {
        if self.controller.city().is_empty() {
            println!("{}", "No active session. Type a city name to start.".dimmed());
            return;
        }

        println!();
        let binding = if self.controller.bound_trip_id().is_some() {
            "saved".green()
        } else {
            "unsaved".yellow()
        };
        println!("{} ({})", self.controller.city().bright_cyan().bold(), binding);
        if !self.controller.hotel().is_empty() {
            println!("Staying near: {}", self.controller.hotel());
        }
        if self.controller.itinerary().is_empty() {
            println!("{}", "Itinerary is empty.".dimmed());
        }
        for (i, item) in self.controller.itinerary().iter().enumerate() {
            let marker = if item.completed { "x".green() } else { " ".normal() };
            println!("  {}. [{}] {}", i + 1, marker, item.title().bright_white());
            if !item.notes.is_empty() {
                println!("         {}", item.notes.dimmed());
            }
        }
        if !self.controller.trip_notes().is_empty() {
            println!("Notes: {}", self.controller.trip_notes());
        }
        println!();
    }

    fn share_trip(&self) {
        if self.controller.itinerary().is_empty() {
            println!("{}", "Nothing to share yet.".dimmed());
            return;
        }
        let titles: Vec<&str> = self.controller.itinerary().iter().map(|item| item.title()).collect();
        println!("{}", format!("My Trip to {}: {}", self.controller.city(), titles.join(", ")).bright_white());
    }

    fn print_trips(&self) {
        match self.trips.list() {
            Ok(trips) if trips.is_empty() => println!("{}", "No saved trips yet.".dimmed()),
            Ok(trips) => {
                println!();
                println!("{}", "Saved Trips:".bright_cyan().bold());
                for (i, trip) in trips.iter().enumerate() {
                    println!(
                        "  {}. {} ({} item(s)) {}",
                        i + 1,
                        trip.city.bright_white(),
                        trip.items.len(),
                        trip.id.dimmed()
                    );
                }
                println!();
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    fn load_trip(&mut self, args: &[&str]) {
        let Some(trip) = self.nth_trip(args) else {
            println!("Usage: {}", "/load <n>".yellow());
            return;
        };
        self.controller.load_trip(&trip);
        self.print_session();
    }

    fn delete_trip(&mut self, args: &[&str]) {
        let Some(trip) = self.nth_trip(args) else {
            println!("Usage: {}", "/delete <n>".yellow());
            return;
        };
        if self.controller.delete_trip(&trip.id) {
            println!("Deleted trip for {}.", trip.city.bright_white());
        } else {
            println!("{}", "Trip was already gone.".dimmed());
        }
    }

    fn nth_trip(&self, args: &[&str]) -> Option<SavedTrip> {
        let trips = self.trips.list().ok()?;
        let i = parse_index(args.first(), trips.len())?;
        trips.into_iter().nth(i)
    }

    fn sign_up(&mut self, args: &[&str]) {
        let [name, email, password] = args else {
            println!("Usage: {}", "/signup <name> <email> <password>".yellow());
            return;
        };
        match self.users.sign_up(name, email, password) {
            Ok(user) => println!("Welcome, {}!", user.name.bright_white()),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    fn log_in(&mut self, args: &[&str]) {
        let [email, password] = args else {
            println!("Usage: {}", "/login <email> <password>".yellow());
            return;
        };
        match self.users.log_in(email, password) {
            Ok(user) => println!("Welcome back, {}!", user.name.bright_white()),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }
}

/// Parse a 1-based user index into a 0-based offset
fn parse_index(arg: Option<&&str>, len: usize) -> Option<usize> {
    let n = arg?.parse::<usize>().ok()?;
    if n == 0 || n > len { None } else { Some(n - 1) }
}

fn print_question(i: usize, question: &QuizQuestion) {
    println!();
    println!("  {}. {}", i + 1, question.text.bright_white());
    for (j, option) in question.options.iter().enumerate() {
        println!("     {}) {}", j + 1, option);
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_is_one_based_and_bounded() {
        let one = "1";
        let three = "3";
        let zero = "0";
        let junk = "abc";
        assert_eq!(parse_index(Some(&one), 3), Some(0));
        assert_eq!(parse_index(Some(&three), 3), Some(2));
        assert_eq!(parse_index(Some(&zero), 3), None);
        assert_eq!(parse_index(Some(&junk), 3), None);
        assert_eq!(parse_index(None, 3), None);
        assert_eq!(parse_index(Some(&one), 0), None);
    }
}
