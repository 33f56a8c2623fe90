use crate::RigConfig;
use crate::scene::{BoneRef, ConstraintKind, Scene};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One inverse kinematics unit of an armature
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IkChain {
    /// Armature owning the chain bones
    pub armature: String,
    /// Bone carrying the IK constraint
    pub root: String,
    /// Root first, then its ancestors, then the leaf if any
    pub chain_bones: Vec<String>,
    pub target: BoneRef,
    /// Child of the root constrained to the same target
    pub leaf: Option<String>,
}

impl IkChain {
    /// Chain bones followed by the target and leaf
    pub fn bones(&self) -> Vec<BoneRef> {
        let walk = self
            .chain_bones
            .iter()
            .filter(|b| self.leaf.as_ref() != Some(*b))
            .map(|b| self.bone_ref(b));

        walk
            .chain(std::iter::once(self.target.to_owned()))
            .chain(self.leaf.iter().map(|b| self.bone_ref(b)))
            .collect()
    }

    pub fn contains(&self, armature: &str, bone: &str) -> bool {
        (self.armature == armature && self.chain_bones.iter().any(|b| b == bone))
            || self.is_target(armature, bone)
    }

    pub fn is_target(&self, armature: &str, bone: &str) -> bool {
        self.target.armature == armature && self.target.bone == bone
    }

    fn bone_ref(&self, bone: &str) -> BoneRef {
        BoneRef {
            armature: self.armature.to_owned(),
            bone: bone.to_owned(),
        }
    }
}

/// Root bone name -> chain
pub type IkMap = BTreeMap<String, IkChain>;

/// Scans the configured IK root bones of an armature and collects their chains
pub fn build_ik_map(scene: &Scene, armature: &str, config: &RigConfig) -> IkMap {
    let mut ik_map = IkMap::new();

    let Some(arm) = scene.armature(armature) else {
        return ik_map;
    };

    for bone in arm.bones.iter().filter(|b| config.is_ik_root(&b.name)) {
        for constraint in bone.constraints.iter() {
            let ConstraintKind::InverseKinematics { target, chain_count, .. } = &constraint.kind else {
                continue;
            };

            let Some((target_object, target_bone)) = target
                .as_ref()
                .and_then(|t| t.subtarget.as_deref().map(|s| (t.object.as_str(), s))) else {
                log::warn!("IK constraint on \"{}\" has no target bone, skipping", bone.name);
                continue;
            };

            if !scene.armature(target_object).is_some_and(|a| a.contains_bone(target_bone)) {
                log::warn!("IK target \"{target_bone}\" of \"{}\" not found on \"{target_object}\", skipping", bone.name);
                continue;
            }

            // Zero chain length means the chain runs to the top of the hierarchy
            let hops = match *chain_count {
                0 => arm.bones.len(),
                n => n as usize,
            };

            let mut chain_bones = Vec::new();
            let mut current = Some(bone);

            for _ in 0..hops {
                let Some(b) = current else {
                    break;
                };

                chain_bones.push(b.name.to_owned());
                current = arm.parent_of(b);
            }

            let leaf = arm
                .children_of(&bone.name)
                .find(|child| child
                    .constraints
                    .iter()
                    .any(|c| c.subtarget() == Some(target_bone)))
                .map(|child| child.name.to_owned());

            if let Some(leaf) = &leaf {
                chain_bones.push(leaf.to_owned());
            }

            ik_map.insert(bone.name.to_owned(), IkChain {
                armature: armature.to_owned(),
                root: bone.name.to_owned(),
                chain_bones,
                target: BoneRef {
                    armature: target_object.to_owned(),
                    bone: target_bone.to_owned(),
                },
                leaf,
            });
        }
    }

    ik_map
}

/// IK maps per armature, built lazily and dropped whenever assets reload
#[derive(Debug, Default)]
pub struct IkMapCache {
    maps: HashMap<String, IkMap>,
}

impl IkMapCache {
    pub fn get(&self, armature: &str) -> Option<&IkMap> {
        self.maps.get(armature)
    }

    pub fn contains(&self, armature: &str) -> bool {
        self.maps.contains_key(armature)
    }

    pub fn get_or_build(&mut self, scene: &Scene, armature: &str, config: &RigConfig) -> &IkMap {
        self.maps
            .entry(armature.to_owned())
            .or_insert_with(|| {
                log::debug!("Building IK map for \"{armature}\"");
                build_ik_map(scene, armature, config)
            })
    }

    /// Chain containing the bone, building the armature's map if needed
    pub fn find_chain(&mut self, scene: &Scene, armature: &str, bone: &str, config: &RigConfig) -> Option<&IkChain> {
        self.get_or_build(scene, armature, config)
            .values()
            .find(|chain| chain.contains(armature, bone))
    }

    /// Whether the bone is the target of a chain in an already built map
    pub fn is_chain_target(&self, armature: &str, bone: &str) -> bool {
        self.get(armature)
            .is_some_and(|map| map.values().any(|c| c.is_target(armature, bone)))
    }

    pub fn clear(&mut self) {
        self.maps.clear();
    }
}
