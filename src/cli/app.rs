//! CLI module for the clevernote application
//!
//! This module handles the command-line interface: it loads the collection,
//! runs one manager operation per command, saves after every mutation and
//! renders the result.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info};
use shell_words::split;
use tempfile::Builder;

use crate::{
    compose, find_template, recent, visible_friends, AccountStore, CnError, Commands, Config,
    CreationContext, KeyValueStore, Note, NoteCollection, NotebookStyle, NotesStorage, Result,
    SortMode, QUICK_PROMPTS, STUDY_TEMPLATES,
};

/// First line of the editor buffer; lines inside the comment are dropped.
const EDITOR_HEADER: &str = "<!--";
const EDITOR_FOOTER: &str = "-->";

/// CLI Application handler - processes CLI commands against the local store
pub struct App<S> {
    /// Note collection persistence
    notes: NotesStorage<S>,

    /// Login flag and stored credentials
    account: AccountStore<S>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl<S: KeyValueStore + Clone> App<S> {
    /// Create a new CLI application on top of the given store and config
    pub fn new(store: S, config: Config, verbose: bool) -> Self {
        Self {
            notes: NotesStorage::new(store.clone()),
            account: AccountStore::new(store),
            config,
            verbose,
        }
    }
}

impl<S: KeyValueStore> App<S> {
    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                color,
                style,
                content,
                file,
                template,
                prompt,
                edit,
            } => {
                let context = creation_context(template, prompt)?;
                self.create_note(context, title, color, style, content, file, edit)
                    .await?
            }

            Commands::List {
                query,
                favorites,
                sort,
                limit,
                json,
                detailed,
            } => {
                self.list_notes(query, favorites, sort, limit, json, detailed)
                    .await?
            }

            Commands::View { id, json } => self.view_note(id, json).await?,

            Commands::Edit { id, content, file } => self.edit_note(id, content, file).await?,

            Commands::Favorite { id } => self.toggle_favorite(id).await?,

            Commands::Delete { id, force } => self.handle_delete(id, force).await?,

            Commands::Recent { favorites, limit } => self.show_recent(favorites, limit).await?,

            Commands::Templates => self.show_templates(),

            Commands::Login { email, password } => {
                let credentials = self.account.login(&email, &password).await?;
                println!("Logged in as {}", credentials.email);
            }

            Commands::Logout => {
                self.account.logout().await?;
                println!("Logged out. You are in guest mode.");
            }

            Commands::Account { toggle } => self.handle_account(toggle).await?,

            Commands::Friends => self.show_friends().await,
        }

        Ok(())
    }

    async fn load_collection(&self) -> NoteCollection {
        NoteCollection::new(self.notes.load().await)
    }

    /// Loads the collection for a command that saves afterwards. A store
    /// read failure aborts the command so the stored notes are not replaced.
    async fn load_for_update(&self) -> Result<NoteCollection> {
        let notes = self.notes.try_load().await.map_err(|e| {
            eprintln!(
                "{} could not read your notes, nothing was changed: {}",
                console::style("Error:").red().bold(),
                e
            );
            e
        })?;
        Ok(NoteCollection::new(notes))
    }

    async fn save_collection(&self, collection: &NoteCollection) -> Result<()> {
        self.notes.save(collection.notes()).await.map_err(|e| {
            eprintln!(
                "{} your change was not saved: {}",
                console::style("Warning:").yellow().bold(),
                e
            );
            e
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_note(
        &self,
        context: CreationContext,
        title: Option<String>,
        color: Option<String>,
        style: Option<NotebookStyle>,
        content: Option<String>,
        file: Option<PathBuf>,
        edit: bool,
    ) -> Result<()> {
        let mut draft = context.draft(title.as_deref(), color.as_deref(), style)?;

        // Explicit content replaces whatever the template or prompt suggested
        if let Some(content) = content {
            draft = draft.with_content(content);
        } else if let Some(file_path) = file {
            draft = draft.with_content(self.read_content_from_file(&file_path)?);
        } else if edit {
            let initial = draft.content().unwrap_or_default().to_string();
            let written = self.open_editor_with_content(draft.title(), &initial)?;
            draft = draft.with_content(written);
        }

        let mut collection = self.load_for_update().await?;
        let note = collection.create(draft);
        self.save_collection(&collection).await?;

        println!("Note created with ID: {}", note.id);
        if self.verbose {
            self.display_notes_text(&[&note], true);
        }
        Ok(())
    }

    /// List notes according to provided filters and options
    async fn list_notes(
        &self,
        query: Option<String>,
        favorites: bool,
        sort: SortMode,
        limit: usize,
        json: bool,
        detailed: bool,
    ) -> Result<()> {
        let collection = self.load_collection().await;
        let mut view = compose(
            collection.notes(),
            query.as_deref().unwrap_or_default(),
            favorites,
            sort,
        );

        if limit > 0 && view.len() > limit {
            view.truncate(limit);
        }

        self.display_notes(&view, json, detailed)
    }

    async fn view_note(&self, id: i64, json: bool) -> Result<()> {
        let collection = self.load_collection().await;
        let note = collection.get(id).ok_or(CnError::NoteNotFound { id })?;

        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
        } else {
            self.display_notes_text(&[note], true);
        }
        Ok(())
    }

    async fn edit_note(&self, id: i64, content: Option<String>, file: Option<PathBuf>) -> Result<()> {
        let mut collection = self.load_for_update().await?;

        let new_content = match (content, file) {
            (Some(content), _) => content,
            (None, Some(file_path)) => self.read_content_from_file(&file_path)?,
            (None, None) => {
                let note = collection.get(id).ok_or(CnError::NoteNotFound { id })?;
                self.open_editor_with_content(&note.title, &note.content)?
            }
        };

        let note = collection.update_content(id, new_content)?;
        self.save_collection(&collection).await?;

        println!("Note {} updated successfully", note.id);
        Ok(())
    }

    async fn toggle_favorite(&self, id: i64) -> Result<()> {
        let mut collection = self.load_for_update().await?;
        let note = collection.toggle_favorite(id)?;
        self.save_collection(&collection).await?;

        if note.is_favorite {
            println!("Added '{}' to favorites", note.title);
        } else {
            println!("Removed '{}' from favorites", note.title);
        }
        Ok(())
    }

    async fn handle_delete(&self, id: i64, force: bool) -> Result<()> {
        let mut collection = self.load_for_update().await?;

        // Step 1: Deleting a note that is not there is a no-op
        let Some(note) = collection.get(id).cloned() else {
            println!("No note with ID {}; nothing deleted.", id);
            return Ok(());
        };

        // Step 2: Show note details and prompt for confirmation (unless force flag is set)
        if !force {
            println!("You are about to delete the following note:");
            println!("ID:      {}", note.id);
            println!("Title:   {}", note.title);
            println!("Created: {}", note.created_at);

            if !note.content.is_empty() {
                let preview = note.content.lines().take(2).collect::<Vec<_>>().join("\n");

                println!("\nContent preview:");
                println!(
                    "{}{}",
                    preview,
                    if note.content.lines().count() > 2 {
                        "..."
                    } else {
                        ""
                    }
                );
            }

            println!("\nThis action cannot be undone!");
            if !confirm("Are you sure you want to delete this note? [y/N]: ")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        // Step 3: Delete and persist
        collection.delete(id);
        self.save_collection(&collection).await?;

        println!(
            "Note '{}' ({}) has been permanently deleted.",
            note.title, note.id
        );
        Ok(())
    }

    async fn show_recent(&self, favorites: bool, limit: Option<usize>) -> Result<()> {
        let collection = self.load_collection().await;
        let limit = limit.unwrap_or(self.config.recent_limit);
        let view = recent(collection.notes(), favorites, limit);

        if view.is_empty() {
            if favorites {
                println!("No favorite notes yet.");
            } else {
                println!("No notes yet. Create one with `clevernote create`.");
            }
            return Ok(());
        }

        for note in view {
            println!(
                "{} {}  {}",
                if note.is_favorite { "★" } else { "•" },
                console::style(&note.title).bold(),
                console::style(&note.created_at).dim()
            );
        }
        Ok(())
    }

    fn show_templates(&self) {
        println!("{}", console::style("Study templates").bold().underlined());
        for template in STUDY_TEMPLATES.iter() {
            println!(
                "\n{} {} [{}]",
                template.emoji,
                console::style(template.course).bold(),
                template.id
            );
            println!("  {}", template.focus);
            println!("  {}", console::style(template.description).dim());
            for task in template.tasks {
                println!("  • {}", task);
            }
            println!(
                "  title: \"{}\", style: {}, color: {}",
                template.default_title, template.default_style, template.suggested_color
            );
        }

        println!("\n{}", console::style("Quick prompts").bold().underlined());
        for prompt in QUICK_PROMPTS {
            println!("  • {}", prompt);
        }
    }

    async fn handle_account(&self, toggle: bool) -> Result<()> {
        let logged_in = if toggle {
            self.account.toggle().await?
        } else {
            self.account.is_logged_in().await
        };

        if logged_in {
            println!("Status: {}", console::style("logged in").green());
            if let Some(credentials) = self.account.credentials().await {
                println!("{}", credentials.email);
            }
        } else {
            println!("Status: {}", console::style("guest mode").cyan());
        }
        Ok(())
    }

    async fn show_friends(&self) {
        let logged_in = self.account.is_logged_in().await;
        let friends = visible_friends(logged_in);

        if !logged_in {
            println!("Log in to see the people you share notes with:");
            println!("  clevernote login --email <EMAIL> --password <PASSWORD>");
            return;
        }

        for friend in friends {
            let status = match friend.status {
                crate::FriendStatus::Online => console::style(friend.status.to_string()).green(),
                crate::FriendStatus::Offline => console::style(friend.status.to_string()).dim(),
            };
            println!(
                "{:<10} {:>2} shared notes  {}",
                friend.name, friend.common_notes, status
            );
        }
    }

    /// Display notes in the requested format
    fn display_notes(&self, notes: &[&Note], json: bool, detailed: bool) -> Result<()> {
        if notes.is_empty() {
            println!("No notes found matching the criteria.");
            return Ok(());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(notes)?);
            return Ok(());
        }

        self.display_notes_text(notes, detailed);

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Display notes in text format
    fn display_notes_text(&self, notes: &[&Note], detailed: bool) {
        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            println!("ID: {} | Created: {}", note.id, note.created_at);
            println!(
                "Title: {}{}",
                console::style(&note.title).bold(),
                if note.is_favorite { " ★" } else { "" }
            );
            println!(
                "Page: {} | Color: {}",
                note.notebook_style,
                console::style(&note.color).dim()
            );

            if detailed {
                if !note.content.is_empty() {
                    println!("\n{}", note.content);
                }
            } else {
                let preview = content_preview(&note.content, 100);
                if !preview.is_empty() {
                    println!("\n{}", preview);
                }
            }
        }
    }

    fn read_content_from_file(&self, file_path: &Path) -> Result<String> {
        if !file_path.is_file() {
            return Err(CnError::FileNotFound {
                file_path: file_path.display().to_string(),
            });
        }

        debug!("Reading note content from {}", file_path.display());
        read_to_string(file_path).map_err(CnError::Io)
    }

    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "{}", EDITOR_HEADER)?;
            writeln!(file, "Editing: {}", title)?;
            writeln!(file, "Write the note content below this comment.")?;
            writeln!(file, "Save and exit the editor when you're done.")?;
            writeln!(file, "{}", EDITOR_FOOTER)?;
            write!(file, "{}", existing_content)?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(strip_editor_header(&content))
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| CnError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, extra_args)) = args.split_first() else {
            return Err(CnError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program)
            .args(extra_args)
            .arg(file_path)
            .status()
            .map_err(|e| CnError::EditorError {
                message: format!("Failed to execute editor command: {}", e),
            })?;

        if !status.success() {
            return Err(CnError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }
}

fn creation_context(template: Option<String>, prompt: Option<String>) -> Result<CreationContext> {
    match (template, prompt) {
        (Some(id), _) => find_template(&id)
            .map(CreationContext::Template)
            .ok_or_else(|| CnError::ApplicationError {
                message: format!(
                    "Unknown template: {}. Run `clevernote templates` to list them.",
                    id
                ),
            }),
        (None, Some(prompt)) => Ok(CreationContext::Prompt(prompt)),
        (None, None) => Ok(CreationContext::Blank),
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{}", question);
    stdout().flush().map_err(CnError::Io)?;

    let mut input = String::new();
    stdin().read_line(&mut input).map_err(CnError::Io)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Drops the leading comment block written into the editor buffer.
fn strip_editor_header(content: &str) -> String {
    let Some(rest) = content.strip_prefix(EDITOR_HEADER) else {
        return content.to_string();
    };

    match rest.find(EDITOR_FOOTER) {
        Some(end) => rest[end + EDITOR_FOOTER.len()..]
            .trim_start_matches(['\r', '\n'])
            .to_string(),
        None => content.to_string(),
    }
}

/// First non-empty line, cut to `max_chars` characters.
fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
