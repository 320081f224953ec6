//! The loader stub installed in place of an extracted bundle.
//!
//! After extraction, the bundle file is replaced by a single entry whose
//! body walks the script source tree at runtime and evaluates each file in
//! order, so the game keeps running from the extracted sources.

use crate::bundle::ScriptEntry;
use crate::compress;
use crate::error::Result;

/// Ordinal carried by the loader stub entry.
pub const LOADER_ORDINAL: i64 = 62_054_200;

/// Runtime source of the loader stub.
const LOADER_SOURCE: &str = r#"def traceback_report
  backtrace = $!.backtrace.clone
  backtrace.each{ |bt|
    bt.sub!(/\{(\d+)\}/) {"[#{$1}]#{$RGSS_SCRIPTS[$1.to_i][1]}"}
  }
  return $!.message + "\n\n" + backtrace.join("\n")
end

def raise_traceback_error
  if $!.message.size >= 900
    File.open('traceback.log', 'w') { |f| f.write($!) }
    raise 'Traceback is too big. Output in traceback.log'
  else
    raise
  end
end

def load_scripts_from_folder(path)
  files, folders = [], []
  Dir.foreach(path) do |f|
    next if f == '.' || f == '..'
    (File.directory?(File.join(path, f))) ? folders.push(f) : files.push(f)
  end

  files.sort!
  files.each do |f|
    code = File.open(File.join(path, f), 'r') { |file| file.read }
    begin
      eval(code, nil, f)
    rescue ScriptError
      raise ScriptError.new($!.message)
    rescue
      $!.message.sub!($!.message, traceback_report)
      raise_traceback_error
    end
  end

  folders.sort!
  folders.each do |folder|
    load_scripts_from_folder(File.join(path, folder))
  end
end

load_scripts_from_folder(File.join(Dir.pwd, File.join('Data', 'Scripts')))
"#;

/// Build the single-entry loader bundle.
pub fn loader_bundle() -> Result<Vec<ScriptEntry>> {
    let body = compress::deflate(LOADER_SOURCE.as_bytes())?;
    Ok(vec![ScriptEntry::new(LOADER_ORDINAL, "Main", body)])
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{loader_bundle, LOADER_ORDINAL};
    use crate::bundle::is_loader;
    use crate::compress::inflate;
    use crate::error::Result;

    #[test]
    fn loader_is_one_recognizable_entry() -> Result<()> {
        let entries = loader_bundle()?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ordinal, LOADER_ORDINAL);
        assert_eq!(entries[0].title, "Main");
        assert!(is_loader(&entries));

        let source = inflate(&entries[0].body)?;
        assert!(source.contains("load_scripts_from_folder"));
        Ok(())
    }
}
