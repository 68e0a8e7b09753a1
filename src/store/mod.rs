/*!
Flat-file storage.

The patient file holds one `codec`-encoded record per line:

```text
1|Jane Doe|30|F|1 Main St|5551234|
3|John Roe|41|M|9 Elm Rd|5550000|Hypertension
```

There's no cache: every call re-reads the file, and every change other
than an append rewrites the whole thing. Rewrites go to a temporary file in
the same directory which is then renamed over the original, so a failure
partway through leaves the old contents intact.

Access rights live in their own file; see the `rights` submodule.
*/
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{Error, Result};
use crate::patient::Patient;

pub mod rights;

pub use rights::{Rights, RightsStore};

/// Open `path` for reading as `codec::SEPARATOR`-delimited rows, or `None` if it doesn't
/// exist.
pub(crate) fn open_rows(path: &Path) -> Result<Option<csv::Reader<File>>> {
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => { return Ok(None); },
        Err(e) => {
            return Err(Error::from(e)
                .annotate(&format!("Unable to open {}", path.display())));
        },
    };

    let r = csv::ReaderBuilder::new()
        .delimiter(codec::SEPARATOR as u8)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(f);

    Ok(Some(r))
}

/// Replace the contents of `path` with `contents` all at once.
pub(crate) fn rewrite_atomically(path: &Path, contents: &str) -> Result<()> {
    log::trace!(
        "rewrite_atomically( {}, [ {} bytes ] ) called.",
        path.display(), contents.len()
    );

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let annotation = format!("Unable to rewrite {}", path.display());

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| Error::from(e).annotate(&annotation))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| Error::from(e).annotate(&annotation))?;
    tmp.as_file().sync_all()
        .map_err(|e| Error::from(e).annotate(&annotation))?;
    tmp.persist(path)
        .map_err(|e| Error::from(e.error).annotate(&annotation))?;

    Ok(())
}

/// Whether `f` is empty or its last byte is a line feed.
fn ends_with_newline(f: &mut File) -> std::io::Result<bool> {
    if f.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    f.seek(SeekFrom::End(-1))?;
    f.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        log::trace!("Store::new( {} ) called.", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Every record, in file order. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<Patient>> {
        log::trace!("Store::load_all() called.");

        let mut reader = match open_rows(&self.path)? {
            Some(r) => r,
            None => {
                log::trace!("    ...{} doesn't exist; empty store.", self.path.display());
                return Ok(Vec::new());
            },
        };

        let mut patients: Vec<Patient> = Vec::new();
        for res in reader.records() {
            let row = res?;
            patients.push(codec::from_record(&row)?);
        }

        log::trace!("    ...Store::load_all() returns {} records.", patients.len());
        Ok(patients)
    }

    /// Tack `p` onto the end of the file. Doesn't check whether its id is
    /// already in use.
    ///
    /// If the last line has no terminator (a hand edit, or a write that was
    /// cut short), one is added first so the new record gets its own line.
    pub fn append(&self, p: &Patient) -> Result<()> {
        log::trace!("Store::append( {:?} ) called.", p);

        let annotation = format!("Unable to append to {}", self.path.display());
        let mut f = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::from(e)
                .annotate(&format!("Unable to open {}", self.path.display())))?;

        let mut line = String::new();
        if !ends_with_newline(&mut f).map_err(|e| Error::from(e).annotate(&annotation))? {
            log::warn!(
                "{} didn't end with a line break; adding one before patient {}.",
                self.path.display(), p.id
            );
            line.push('\n');
        }
        line.push_str(&codec::encode(p));
        line.push('\n');

        f.write_all(line.as_bytes())
            .map_err(|e| Error::from(e).annotate(&annotation))?;

        log::info!("Appended patient {} to {}.", p.id, self.path.display());
        Ok(())
    }

    /// Replace the first record whose id matches `p.id`.
    pub fn update(&self, p: &Patient) -> Result<()> {
        log::trace!("Store::update( {:?} ) called.", p);

        let mut patients = self.load_all()?;
        match patients.iter_mut().find(|x| x.id == p.id) {
            Some(slot) => { *slot = p.clone(); },
            None => { return Err(Error::RecordNotFound(p.id)); },
        }
        self.rewrite(&patients)?;

        log::info!("Updated patient {}.", p.id);
        Ok(())
    }

    pub fn delete(&self, id: u32) -> Result<()> {
        log::trace!("Store::delete( {} ) called.", id);

        let mut patients = self.load_all()?;
        let n_before = patients.len();
        patients.retain(|x| x.id != id);
        if patients.len() == n_before {
            return Err(Error::RecordNotFound(id));
        }
        if n_before - patients.len() > 1 {
            log::warn!(
                "Deleting patient {} removed {} records.",
                id, n_before - patients.len()
            );
        }
        self.rewrite(&patients)?;

        log::info!("Deleted patient {}.", id);
        Ok(())
    }

    pub fn find(&self, id: u32) -> Result<Patient> {
        log::trace!("Store::find( {} ) called.", id);

        self.load_all()?
            .into_iter()
            .find(|x| x.id == id)
            .ok_or(Error::RecordNotFound(id))
    }

    /// One more than the largest id on file, or 1 if there are none.
    ///
    /// Nothing is reserved; two callers asking before either appends will
    /// get the same answer.
    pub fn next_id(&self) -> Result<u32> {
        let max = self.load_all()?
            .iter()
            .map(|p| p.id)
            .max()
            .unwrap_or(0);

        max.checked_add(1)
            .ok_or_else(|| Error::Storage("patient ids exhausted".to_owned()))
    }

    fn rewrite(&self, patients: &[Patient]) -> Result<()> {
        let mut contents = String::new();
        for p in patients.iter() {
            contents.push_str(&codec::encode(p));
            contents.push('\n');
        }
        rewrite_atomically(&self.path, &contents)
    }
}
